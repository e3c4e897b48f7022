pub mod car;
pub mod resistance;
pub mod steering;

pub use car::CarModel;
pub use resistance::RollingResistance;
pub use steering::{smooth_steering, steering_target};
