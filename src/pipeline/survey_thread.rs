//! Survey thread - real-time magnetometer processing.
//!
//! This thread:
//! - Receives magnetometer samples via crossbeam channels
//! - Counts wheel revolutions and appends auto stations to the store
//! - Handles commands (manual stations, calibration, reset) without
//!   blocking the sample path
//! - Publishes a status snapshot after every event
//!
//! A 1 Hz ticker drives the guided calibration countdown so the session
//! finishes on time even when no samples arrive.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{select, tick, Receiver};
use log::{error, info, warn};

use crate::core::types::{RecordType, SurveyStation};
use crate::io::settings::SurveySettings;
use crate::pipeline::status::SharedStatus;
use crate::sensors::calibration::{CalibrationEngine, SessionTick};
use crate::sensors::rotation::{RotationCounter, RotationCounterConfig};
use crate::survey::store::RecordStore;

/// One magnetometer reading with the compass heading captured alongside.
#[derive(Debug, Clone, Copy)]
pub struct SensorSample {
    pub magnitude: f32,
    /// Compass heading in degrees, -1 when unavailable.
    pub heading: f32,
}

/// Commands accepted by the survey thread.
#[derive(Debug, Clone)]
pub enum SurveyCommand {
    /// Save a manual station with wall offsets at the current distance.
    SaveManualStation {
        depth: f32,
        left: f32,
        right: f32,
        up: f32,
        down: f32,
    },
    /// Start a guided calibration session.
    StartCalibration { duration_secs: u32 },
    CancelCalibration,
    /// Calibrate from the rolling history right now.
    InstantCalibration,
    /// Delete all stations and restart numbering.
    ResetAll,
}

/// Configuration for the survey thread.
#[derive(Debug, Clone)]
pub struct SurveyThreadConfig {
    pub counter: RotationCounterConfig,
    /// Settings file updated when calibration commits (optional).
    pub settings_path: Option<PathBuf>,
}

impl Default for SurveyThreadConfig {
    fn default() -> Self {
        Self {
            counter: RotationCounterConfig::default(),
            settings_path: None,
        }
    }
}

/// Survey thread handle. Joining returns the store so callers can export
/// or inspect the collected stations.
pub struct SurveyThread {
    handle: JoinHandle<Box<dyn RecordStore + Send>>,
}

impl SurveyThread {
    /// Spawn the survey thread.
    pub fn spawn(
        config: SurveyThreadConfig,
        store: Box<dyn RecordStore + Send>,
        sample_rx: Receiver<SensorSample>,
        command_rx: Receiver<SurveyCommand>,
        status: SharedStatus,
        running: Arc<AtomicBool>,
    ) -> Self {
        let handle = thread::Builder::new()
            .name("survey".into())
            .spawn(move || run_loop(config, store, sample_rx, command_rx, status, running))
            .expect("Failed to spawn survey thread");

        Self { handle }
    }

    /// Wait for the thread to finish and take the store back.
    pub fn join(self) -> thread::Result<Box<dyn RecordStore + Send>> {
        self.handle.join()
    }
}

struct SurveyContext {
    counter: RotationCounter,
    engine: CalibrationEngine,
    store: Box<dyn RecordStore + Send>,
    settings: SurveySettings,
    settings_path: Option<PathBuf>,
    station_count: u32,
    seconds_left: u32,
    last_heading: f32,
}

fn run_loop(
    config: SurveyThreadConfig,
    store: Box<dyn RecordStore + Send>,
    sample_rx: Receiver<SensorSample>,
    command_rx: Receiver<SurveyCommand>,
    status: SharedStatus,
    running: Arc<AtomicBool>,
) -> Box<dyn RecordStore + Send> {
    info!("survey thread starting");

    let settings = match &config.settings_path {
        Some(path) => SurveySettings::load(path).unwrap_or_default(),
        None => SurveySettings::default(),
    };

    let mut counter_config = config.counter;
    counter_config.thresholds = settings.thresholds();
    counter_config.wheel_circumference_cm = settings.wheel_circumference_cm;

    let mut ctx = SurveyContext {
        counter: RotationCounter::new(counter_config),
        engine: CalibrationEngine::new(settings.thresholds(), settings.calibrated),
        store,
        settings,
        settings_path: config.settings_path,
        station_count: 0,
        seconds_left: 0,
        last_heading: -1.0,
    };

    let ticker = tick(Duration::from_secs(1));

    while running.load(Ordering::Relaxed) {
        select! {
            recv(sample_rx) -> result => {
                if let Ok(sample) = result {
                    ctx.process_sample(sample);
                    ctx.publish(&status);
                }
            }
            recv(command_rx) -> result => {
                if let Ok(command) = result {
                    ctx.process_command(command);
                    ctx.publish(&status);
                }
            }
            recv(ticker) -> _ => {
                ctx.process_tick();
                ctx.publish(&status);
            }
            // Timeout to allow checking the running flag
            default(Duration::from_millis(10)) => {}
        }
    }

    info!(
        "survey thread shutting down ({} stations recorded)",
        ctx.station_count
    );
    ctx.store
}

impl SurveyContext {
    fn process_sample(&mut self, sample: SensorSample) {
        if sample.heading >= 0.0 {
            self.last_heading = sample.heading;
        }

        // During a guided session samples feed calibration, not counting
        if self.engine.is_calibrating() {
            self.counter.record_sample(sample.magnitude);
            self.engine.add_sample(sample.magnitude);
            return;
        }

        if self.counter.process(sample.magnitude) {
            self.append_station(SurveyStation {
                record_number: 0,
                distance: self.counter.rounded_distance_m(),
                heading: self.last_heading.max(0.0),
                depth: 0.0,
                left: 0.0,
                right: 0.0,
                up: 0.0,
                down: 0.0,
                record_type: RecordType::Auto,
            });
        }
    }

    fn process_command(&mut self, command: SurveyCommand) {
        match command {
            SurveyCommand::SaveManualStation {
                depth,
                left,
                right,
                up,
                down,
            } => {
                self.append_station(SurveyStation {
                    record_number: 0,
                    distance: self.counter.rounded_distance_m(),
                    heading: self.last_heading.max(0.0),
                    depth,
                    left,
                    right,
                    up,
                    down,
                    record_type: RecordType::Manual,
                });
            }
            SurveyCommand::StartCalibration { duration_secs } => {
                if self.engine.begin_session(duration_secs) {
                    self.seconds_left = duration_secs;
                } else {
                    warn!("calibration already running");
                }
            }
            SurveyCommand::CancelCalibration => {
                self.engine.cancel();
                self.seconds_left = 0;
            }
            SurveyCommand::InstantCalibration => {
                let history: Vec<f32> = self.counter.history().collect();
                match self.engine.instant(&history) {
                    Ok(thresholds) => self.commit_thresholds(thresholds),
                    Err(e) => warn!("instant calibration failed: {e}"),
                }
            }
            SurveyCommand::ResetAll => {
                if let Err(e) = self.store.reset_all() {
                    error!("store reset failed: {e}");
                }
                self.counter.reset();
                self.station_count = 0;
            }
        }
    }

    fn process_tick(&mut self) {
        match self.engine.tick() {
            SessionTick::Idle => {}
            SessionTick::Counting(seconds) => self.seconds_left = seconds,
            SessionTick::Committed(thresholds) => {
                self.seconds_left = 0;
                self.commit_thresholds(thresholds);
            }
            SessionTick::Aborted { samples } => {
                self.seconds_left = 0;
                warn!("calibration session ended with only {samples} samples");
            }
        }
    }

    fn commit_thresholds(&mut self, thresholds: crate::sensors::calibration::Thresholds) {
        self.counter.set_thresholds(thresholds);
        self.settings.apply_thresholds(thresholds);
        if let Some(path) = &self.settings_path {
            if let Err(e) = self.settings.save(path) {
                error!("failed to persist settings: {e}");
            }
        }
    }

    fn append_station(&mut self, station: SurveyStation) {
        match self.store.append(station) {
            Ok(number) => {
                self.station_count += 1;
                info!(
                    "station {} at {:.2} m ({})",
                    number, station.distance, station.record_type
                );
            }
            Err(e) => error!("failed to append station: {e}"),
        }
    }

    fn publish(&self, status: &SharedStatus) {
        let mut snapshot = status.write();
        snapshot.revolutions = self.counter.revolutions();
        snapshot.distance_m = self.counter.distance_m();
        snapshot.thresholds = self.engine.thresholds();
        snapshot.calibrated = self.engine.is_calibrated();
        snapshot.calibrating = self.engine.is_calibrating();
        snapshot.calibration_seconds_left = self.seconds_left;
        snapshot.station_count = self.station_count;
        snapshot.last_heading = self.last_heading;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::status::new_shared_status;
    use crate::survey::store::MemoryStore;
    use crossbeam_channel::unbounded;

    fn spawn_thread() -> (
        crossbeam_channel::Sender<SensorSample>,
        crossbeam_channel::Sender<SurveyCommand>,
        SharedStatus,
        Arc<AtomicBool>,
        SurveyThread,
    ) {
        let (sample_tx, sample_rx) = unbounded();
        let (command_tx, command_rx) = unbounded();
        let status = new_shared_status();
        let running = Arc::new(AtomicBool::new(true));
        let thread = SurveyThread::spawn(
            SurveyThreadConfig::default(),
            Box::new(MemoryStore::new()),
            sample_rx,
            command_rx,
            status.clone(),
            running.clone(),
        );
        (sample_tx, command_tx, status, running, thread)
    }

    fn settle() {
        thread::sleep(Duration::from_millis(100));
    }

    #[test]
    fn test_revolutions_become_auto_stations() {
        let (sample_tx, _command_tx, status, running, thread) = spawn_thread();

        for _ in 0..3 {
            sample_tx
                .send(SensorSample {
                    magnitude: 1000.0,
                    heading: 90.0,
                })
                .unwrap();
            sample_tx
                .send(SensorSample {
                    magnitude: 1300.0,
                    heading: 90.0,
                })
                .unwrap();
        }
        settle();

        {
            let snapshot = status.read();
            assert_eq!(snapshot.revolutions, 3);
            assert_eq!(snapshot.station_count, 3);
            assert_eq!(snapshot.last_heading, 90.0);
        }

        running.store(false, Ordering::Relaxed);
        let store = thread.join().unwrap();
        let stations = store.load_all().unwrap();
        assert_eq!(stations.len(), 3);
        assert_eq!(stations[0].record_type, RecordType::Auto);
        assert_eq!(stations[2].record_number, 3);
    }

    #[test]
    fn test_manual_station_carries_offsets() {
        let (sample_tx, command_tx, _status, running, thread) = spawn_thread();

        sample_tx
            .send(SensorSample {
                magnitude: 1300.0,
                heading: 45.0,
            })
            .unwrap();
        settle();
        command_tx
            .send(SurveyCommand::SaveManualStation {
                depth: 4.5,
                left: 1.0,
                right: 2.0,
                up: 0.5,
                down: 3.0,
            })
            .unwrap();
        settle();

        running.store(false, Ordering::Relaxed);
        let store = thread.join().unwrap();
        let stations = store.load_all().unwrap();
        assert_eq!(stations.len(), 2);
        let manual = stations[1];
        assert_eq!(manual.record_type, RecordType::Manual);
        assert_eq!(manual.depth, 4.5);
        assert_eq!(manual.left, 1.0);
        assert_eq!(manual.heading, 45.0);
    }

    #[test]
    fn test_calibration_session_suspends_counting() {
        let (sample_tx, command_tx, status, running, thread) = spawn_thread();

        command_tx
            .send(SurveyCommand::StartCalibration { duration_secs: 60 })
            .unwrap();
        settle();
        assert!(status.read().calibrating);

        // Peaks during calibration must not count
        for _ in 0..3 {
            sample_tx
                .send(SensorSample {
                    magnitude: 1000.0,
                    heading: -1.0,
                })
                .unwrap();
            sample_tx
                .send(SensorSample {
                    magnitude: 1300.0,
                    heading: -1.0,
                })
                .unwrap();
        }
        settle();
        assert_eq!(status.read().revolutions, 0);

        command_tx.send(SurveyCommand::CancelCalibration).unwrap();
        settle();
        assert!(!status.read().calibrating);

        running.store(false, Ordering::Relaxed);
        thread.join().unwrap();
    }

    #[test]
    fn test_instant_calibration_updates_thresholds() {
        let (sample_tx, command_tx, status, running, thread) = spawn_thread();

        for i in 0..20 {
            sample_tx
                .send(SensorSample {
                    magnitude: 500.0 + i as f32 * 10.0,
                    heading: -1.0,
                })
                .unwrap();
        }
        settle();
        command_tx.send(SurveyCommand::InstantCalibration).unwrap();
        settle();

        {
            let snapshot = status.read();
            assert!(snapshot.calibrated);
            assert!(snapshot.thresholds.low > 500.0);
            assert!(snapshot.thresholds.high < 700.0);
        }

        running.store(false, Ordering::Relaxed);
        thread.join().unwrap();
    }

    #[test]
    fn test_reset_all_clears_store() {
        let (sample_tx, command_tx, status, running, thread) = spawn_thread();

        sample_tx
            .send(SensorSample {
                magnitude: 1300.0,
                heading: 0.0,
            })
            .unwrap();
        settle();
        command_tx.send(SurveyCommand::ResetAll).unwrap();
        settle();

        assert_eq!(status.read().revolutions, 0);
        assert_eq!(status.read().station_count, 0);

        running.store(false, Ordering::Relaxed);
        let store = thread.join().unwrap();
        assert!(store.load_all().unwrap().is_empty());
    }
}
