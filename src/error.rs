//! Error types for widget setup and configuration.
//!
//! Only configuration problems are errors. Runtime no-ops (opening an open
//! modal, out-of-range indices, transitions while busy) are silently ignored.

/// Configuration error raised while wiring a widget to the document.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum WidgetError {
    /// No element carries the requested id
    #[error("Element with id \"{id}\" not found")]
    MissingContainer { id: String },

    /// A required element is absent inside a container
    #[error("Required element {selector} not found")]
    MissingElement { selector: String },

    /// A trigger is missing its declarative attribute value
    #[error("Element {element} is missing required attribute {attribute}")]
    MissingAttribute { element: String, attribute: String },

    /// Tab and panel lists must pair 1:1
    #[error("Tabs container has {tabs} tabs but {panels} panels")]
    TabPanelMismatch { tabs: usize, panels: usize },

    /// Pre-existing carousel indicators do not pair 1:1 with slides
    #[error("Carousel has {indicators} indicators but {slides} slides")]
    IndicatorMismatch { indicators: usize, slides: usize },

    /// The registry was used before `WidgetRegistry::install`
    #[error("Widget registry is not installed")]
    NotInstalled,

    /// Configuration document could not be parsed
    #[error("Invalid widget configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result alias for widget setup.
pub type Result<T> = std::result::Result<T, WidgetError>;
