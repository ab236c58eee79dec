use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use dashmap::DashMap;
use log::{info, warn};

use crate::building_blocks::SampleBuffer;
use crate::error::Error;

/// one named load request. the payload is raw little-endian f32
/// frames, mono or interleaved stereo.
pub struct FileInfo {
    pub name: String,
    pub path: PathBuf,
    pub channels: usize,
}

/// explicit per-task state, tasks are keyed by resource name
#[derive(Clone, Copy, PartialEq, Eq)]
enum TaskState {
    Pending,
    Loaded,
    Failed,
}

/// the outcome of a partially failed batch: everything that did load
/// stays usable, plus the names that didn't make it
#[derive(Debug)]
pub struct LoadReport {
    pub buffers: HashMap<String, SampleBuffer>,
    pub failed: Vec<String>,
    pub total: usize,
}

/// load a batch of raw sample files, one worker thread per task,
/// joined over a channel barrier. `on_progress(name, finished, total)`
/// fires as each task settles, regardless of outcome.
///
/// all tasks loaded resolves to the full buffer map; any failure
/// resolves to `Error::PartialLoad` carrying the surviving buffers,
/// without aborting loads that already succeeded.
pub fn load_raw_files<F>(
    files: Vec<FileInfo>,
    mut on_progress: F,
) -> Result<HashMap<String, SampleBuffer>, Error>
where
    F: FnMut(&str, usize, usize),
{
    let mut tasks: HashMap<String, TaskState> = HashMap::new();
    let buffers: Arc<DashMap<String, SampleBuffer>> = Arc::new(DashMap::new());
    let (tx, rx) = crossbeam::channel::unbounded::<(String, bool)>();

    for info in files {
        if tasks.contains_key(&info.name) {
            // first request wins
            warn!("duplicate name when loading: {}, skipping", info.name);
            continue;
        }
        tasks.insert(info.name.clone(), TaskState::Pending);

        let tx = tx.clone();
        let buffers = Arc::clone(&buffers);
        thread::spawn(move || {
            let ok = match read_raw_file(&info.path, info.channels) {
                Ok(buffer) => {
                    buffers.insert(info.name.clone(), buffer);
                    true
                }
                Err(e) => {
                    warn!("loading failure: {} ({})", info.path.display(), e);
                    false
                }
            };
            // release the map handle before signalling completion, the
            // barrier below assumes the last signal is the last handle
            drop(buffers);
            let _ = tx.send((info.name, ok));
        });
    }
    drop(tx);

    // join barrier: wait until every task has left the pending state
    let total = tasks.len();
    let mut finished = 0;
    for (name, ok) in rx.iter() {
        finished += 1;
        tasks.insert(
            name.clone(),
            if ok { TaskState::Loaded } else { TaskState::Failed },
        );
        if ok {
            info!("file loaded: {} ({}/{})", name, finished, total);
        }
        on_progress(&name, finished, total);
    }

    let mut failed: Vec<String> = tasks
        .iter()
        .filter(|(_, state)| **state == TaskState::Failed)
        .map(|(name, _)| name.clone())
        .collect();
    failed.sort();

    // every worker has signalled, so this is normally the last handle
    let buffers = match Arc::try_unwrap(buffers) {
        Ok(map) => map.into_iter().collect::<HashMap<_, _>>(),
        Err(arc) => arc
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect(),
    };

    if failed.is_empty() {
        Ok(buffers)
    } else {
        Err(Error::PartialLoad(LoadReport {
            buffers,
            failed,
            total,
        }))
    }
}

fn read_raw_file(path: &std::path::Path, channels: usize) -> Result<SampleBuffer, Error> {
    let bytes = std::fs::read(path)?;

    if channels == 0 || bytes.len() % (4 * channels) != 0 {
        return Err(Error::MalformedData(format!(
            "{} bytes don't fit {} f32 channels",
            bytes.len(),
            channels
        )));
    }

    let samples: Vec<f32> = bytes
        .chunks(4)
        .map(|b| f32::from_le_bytes(b.try_into().unwrap()))
        .collect();

    match channels {
        1 => Ok(SampleBuffer::Mono(samples)),
        2 => {
            // de-interleave
            let mut left = Vec::with_capacity(samples.len() / 2);
            let mut right = Vec::with_capacity(samples.len() / 2);
            for frame in samples.chunks(2) {
                left.push(frame[0]);
                right.push(frame[1]);
            }
            Ok(SampleBuffer::Stereo(left, right))
        }
        n => Err(Error::MalformedData(format!(
            "unsupported channel count {}",
            n
        ))),
    }
}
