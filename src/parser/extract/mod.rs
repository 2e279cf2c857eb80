pub mod appfolio;
pub mod campus;
pub mod ever;
pub mod floorplan;
pub mod granite;
pub mod purdue;
pub mod rise;
pub mod smartdigs;
pub mod wabash;
pub mod yugo;
