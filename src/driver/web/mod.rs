mod driver;

pub use driver::{BrowserConfig, PlaywrightBrowser};
