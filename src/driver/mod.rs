pub mod locator;
pub mod traits;
pub mod web;

#[cfg(test)]
pub(crate) mod testing;

pub use locator::{Control, ControlLocator, LocatorStrategy};
pub use traits::Browser;
pub use web::{BrowserConfig, PlaywrightBrowser};
