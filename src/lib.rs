//! DogMove - step counting and signal exploration for dog accelerometer data
//!
//! DogMove reads the DogMove accelerometer/gyroscope recordings and turns a
//! selected gait segment into a step count through a deterministic pipeline:
//! schema check → feature derivation → segment isolation → peak detection
//! → report encoding.
//!
//! ## Modules
//!
//! - **Dataset Preparation**: `schema`, `features`, `loader`
//! - **Step Counter**: `gait`, `peaks`, `step_counter`
//! - **Explorer API**: `pipeline`, `encoder`

pub mod config;
pub mod encoder;
pub mod error;
pub mod features;
pub mod gait;
pub mod loader;
pub mod peaks;
pub mod pipeline;
pub mod schema;
pub mod step_counter;
pub mod types;

#[cfg(test)]
mod testutil;

pub use config::Config;
pub use error::{ComputeError, DataLoadError, InvalidBehaviorError};
pub use gait::{gait_behaviors, Gait};
pub use loader::{Dataset, DatasetLoader};
pub use pipeline::{count_steps_in_file, Explorer};
pub use step_counter::StepCounter;
pub use types::{SignalColumn, SignalSeries, StepReport, StepSegment, SubjectTrialId};

// Schema exports
pub use schema::{RecordAdapter, SAMPLE_RATE_HZ, SCHEMA_NAME};

/// DogMove version embedded in all step reports
pub const DOGMOVE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for step reports
pub const PRODUCER_NAME: &str = "dogmove";
