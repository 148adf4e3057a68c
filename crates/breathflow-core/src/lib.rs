//! BreathFlow Core - Breath-Phase Inference Pipeline
//!
//! This crate contains the domain model for BreathFlow, including:
//! - Two-stage exponential smoothing of the raw amplitude signal
//! - Hysteresis-based inhale/exhale phase detection with debounce
//! - Bounded breath-cycle ledger
//! - Continuously reprojected inhale/exhale ratio estimation
//! - Session context threading the pipeline through each sample tick
//!
//! The pipeline is single-threaded and tick-driven: the host feeds one
//! amplitude sample per tick into a [`BreathSession`], which returns the
//! detected phase transition (if any) and the current timing ratio. Audio
//! capture and rendering are external collaborators; this crate only exposes
//! read-only views of the smoothed series and cycle history for them.

#![warn(missing_docs)]

pub mod config;
pub mod cycle;
pub mod detector;
pub mod easing;
pub mod logging;
pub mod ratio;
pub mod session;
pub mod smoother;

// --- Re-exports grouped by category ---

// Configuration
pub use config::{BreathConfig, ConfigError, DetectorConfig, RatioConfig, SmootherConfig};

// Pipeline components
pub use cycle::{BreathCycle, CycleLedger};
pub use detector::{Phase, PhaseDetector, PhaseTransition};
pub use ratio::RatioEstimator;
pub use smoother::{SignalSmoother, SmoothedSample};

// Session context
pub use session::{BreathSession, Tick};

// Easing projection for the rendering collaborator
pub use easing::{breath_progress, ease_in_quad, ease_out_quad, EasingMode};

// Logging & diagnostics
pub use logging::LogConfig;
