//! Configuration loading and structures

mod settings;

pub use settings::{
    GeneralSettings, LimiterSettings, RealIpMethod, RoutingSettings, SecuritySettings,
    ServerSettings, Settings,
};
