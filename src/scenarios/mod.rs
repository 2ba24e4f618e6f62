pub mod common;
pub mod features;
pub mod smoke;
pub mod ui;

pub use features::FeatureCheck;
pub use smoke::SmokeCheck;
pub use ui::{UiCheck, UiContext};
