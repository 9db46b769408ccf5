use giffos_core::QualityMode;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    /// The search box text changed
    SetQuery(String),
    SetQuality(QualityMode),
    SetApiKey(String),
    LoadMore,
    Select(usize),
    /// Copy the selected GIF to the clipboard
    Copy,
    /// Re-send the stored key and the current results, e.g. once a freshly
    /// loaded window starts listening
    Resync,
    Shutdown,
}
