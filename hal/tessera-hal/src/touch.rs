//! Touch controller abstractions
//!
//! Single-point polling interface. Drivers decode their own protocol and
//! coordinate mapping; callers only see screen coordinates.

/// Touch controller
pub trait TouchController {
    /// Error type for touch operations
    type Error;

    /// Detect and configure the controller
    fn init(&mut self) -> Result<(), Self::Error>;

    /// Whether the controller has anything to report
    ///
    /// Controllers without an interrupt line always report `true`.
    fn has_signal(&mut self) -> bool;

    /// Poll the controller; `true` while a finger is down
    ///
    /// Updates [`last_point`](Self::last_point) on a fresh touch.
    fn is_touched(&mut self) -> bool;

    /// Whether the last contact has been lifted
    fn is_released(&mut self) -> bool;

    /// Last reported touch position in screen coordinates
    fn last_point(&self) -> (i32, i32);
}
