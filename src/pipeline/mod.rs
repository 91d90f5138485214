//! Survey pipeline: the sensor-processing thread and its shared status.

pub mod status;
pub mod survey_thread;

pub use status::{new_shared_status, SharedStatus, SurveyStatus};
pub use survey_thread::{SensorSample, SurveyCommand, SurveyThread, SurveyThreadConfig};
