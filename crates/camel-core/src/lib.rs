#![deny(warnings)]
pub mod estimate;
pub mod game;
pub mod model;

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "camel-race"
    }

    pub const fn codename() -> &'static str {
        "Leg Engine"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}
