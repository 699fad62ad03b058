//! # Generator Pool
//!
//! Parallel generation with one [`ChunkGenerator`] per worker thread.
//!
//! ```text
//!            ┌──────────► worker 0 (own generator) ──┐
//! submit ──► requests ──► worker 1 (own generator) ──┼──► results ──► recv
//!            └──────────► worker N (own generator) ──┘
//! ```
//!
//! Every worker is built from the same seed and config, so a chunk comes
//! out identical whichever worker picks it up. Results arrive in
//! completion order and carry their coordinate.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::debug;

use crate::biome::BiomeSource;
use crate::chunk::{BlockVolume, ChunkCoord};
use crate::config::GeneratorConfig;
use crate::error::{GenerationError, GenerationResult};
use crate::generator::{ChunkGenerator, ChunkStats};
use crate::seed::WorldSeed;

/// One finished request.
#[derive(Debug)]
pub struct PoolOutput {
    /// Requested chunk.
    pub coord: ChunkCoord,
    /// Volume and counters, or the collaborator fault that stopped it.
    pub result: GenerationResult<(BlockVolume, ChunkStats)>,
}

/// Fixed set of generator threads fed through a request channel.
pub struct GeneratorPool {
    /// Closed on drop so workers drain and exit.
    request_tx: Option<Sender<ChunkCoord>>,
    result_rx: Receiver<PoolOutput>,
    workers: Vec<JoinHandle<()>>,
    /// Submitted but not yet received.
    pending: usize,
}

impl GeneratorPool {
    /// Spawns `workers` threads (at least one).
    ///
    /// Generators are built on the calling thread, so configuration
    /// errors surface here rather than inside a worker.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn new(
        seed: WorldSeed,
        config: &GeneratorConfig,
        biomes: &Arc<dyn BiomeSource>,
        workers: usize,
    ) -> GenerationResult<Self> {
        let count = workers.max(1);
        let (request_tx, request_rx) = unbounded::<ChunkCoord>();
        let (result_tx, result_rx) = unbounded::<PoolOutput>();

        let generators = (0..count)
            .map(|_| ChunkGenerator::new(seed, config.clone(), Arc::clone(biomes)))
            .collect::<GenerationResult<Vec<_>>>()?;

        let workers = generators
            .into_iter()
            .enumerate()
            .map(|(id, generator)| {
                let requests = request_rx.clone();
                let results = result_tx.clone();
                thread::spawn(move || Self::worker_loop(id, generator, &requests, &results))
            })
            .collect();

        Ok(Self {
            request_tx: Some(request_tx),
            result_rx,
            workers,
            pending: 0,
        })
    }

    fn worker_loop(id: usize, mut generator: ChunkGenerator, requests: &Receiver<ChunkCoord>, results: &Sender<PoolOutput>) {
        debug!("Generator worker {id} started");
        for coord in requests {
            let result = generator.generate_with_stats(coord);
            if results.send(PoolOutput { coord, result }).is_err() {
                break;
            }
        }
        debug!("Generator worker {id} stopped");
    }

    /// Number of worker threads.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers.len()
    }

    /// Requests submitted but not yet received.
    #[must_use]
    pub const fn pending(&self) -> usize {
        self.pending
    }

    /// Queues one chunk.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::WorkerDisconnected`] if every worker has exited.
    pub fn submit(&mut self, coord: ChunkCoord) -> GenerationResult<()> {
        let tx = self.request_tx.as_ref().ok_or(GenerationError::WorkerDisconnected)?;
        tx.send(coord).map_err(|_| GenerationError::WorkerDisconnected)?;
        self.pending += 1;
        Ok(())
    }

    /// Blocks for the next finished chunk; `None` once nothing is pending.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::WorkerDisconnected`] if the workers exited
    /// with requests outstanding.
    pub fn recv(&mut self) -> GenerationResult<Option<PoolOutput>> {
        if self.pending == 0 {
            return Ok(None);
        }
        let output = self.result_rx.recv().map_err(|_| GenerationError::WorkerDisconnected)?;
        self.pending -= 1;
        Ok(Some(output))
    }

    /// Submits every coordinate and waits for all of them.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::WorkerDisconnected`] if the pool shut down.
    /// Per-chunk faults are reported inside each [`PoolOutput`].
    pub fn generate_all(&mut self, coords: impl IntoIterator<Item = ChunkCoord>) -> GenerationResult<Vec<PoolOutput>> {
        for coord in coords {
            self.submit(coord)?;
        }
        let mut outputs = Vec::with_capacity(self.pending);
        while let Some(output) = self.recv()? {
            outputs.push(output);
        }
        Ok(outputs)
    }
}

impl Drop for GeneratorPool {
    fn drop(&mut self) {
        // Closing the request channel ends every worker loop
        self.request_tx.take();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::{Biome, UniformBiomeSource};

    fn biomes() -> Arc<dyn BiomeSource> {
        Arc::new(UniformBiomeSource::new(Biome::Forest))
    }

    #[test]
    fn test_pool_matches_single_generator() {
        let seed = WorldSeed::new(2024);
        let config = GeneratorConfig::overworld();
        let coords: Vec<_> = (-1..2).flat_map(|x| (-1..2).map(move |z| ChunkCoord::new(x, z))).collect();

        let mut pool = GeneratorPool::new(seed, &config, &biomes(), 3).expect("preset is valid");
        let outputs = pool.generate_all(coords.iter().copied()).expect("pool is running");
        assert_eq!(outputs.len(), coords.len());
        assert_eq!(pool.pending(), 0);

        let mut single = ChunkGenerator::new(seed, config, biomes()).expect("preset is valid");
        for output in outputs {
            let (volume, _) = output.result.expect("generation succeeds");
            assert_eq!(volume, single.generate(output.coord).expect("generation succeeds"));
        }
    }

    #[test]
    fn test_recv_without_requests_is_none() {
        let mut pool =
            GeneratorPool::new(WorldSeed::new(1), &GeneratorConfig::overworld(), &biomes(), 0).expect("preset is valid");
        assert_eq!(pool.workers(), 1);
        assert!(pool.recv().expect("pool is running").is_none());
    }

    #[test]
    fn test_invalid_config_fails_before_spawning() {
        let mut config = GeneratorConfig::overworld();
        config.octaves.landmass = 0;
        assert!(GeneratorPool::new(WorldSeed::new(1), &config, &biomes(), 4).is_err());
    }

    #[test]
    fn test_drop_with_pending_requests_joins() {
        let mut pool =
            GeneratorPool::new(WorldSeed::new(5), &GeneratorConfig::hell(), &biomes(), 2).expect("preset is valid");
        for x in 0..4 {
            pool.submit(ChunkCoord::new(x, 0)).expect("pool is running");
        }
        drop(pool);
    }
}
