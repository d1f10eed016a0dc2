// Problem scoring: signal matching and the engagement-weighted rank.

pub mod rank;
