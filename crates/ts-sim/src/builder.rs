//! Fluent builder for constructing a [`Sim`].

use tracing::info;
use ts_core::{Asn, MoteId, MoteRng, Settings, SimRng};
use ts_mote::{Action, Mote, MoteConfig, OfKind};
use ts_net::{ConnectivityMatrix, Topology, TopologyKind};
use ts_schedule::EventScheduler;

use crate::{Sim, SimError, SimResult};

/// Fluent builder for [`Sim`].
///
/// # Required inputs
///
/// - [`Settings`] — mote count, seed, topology and objective-function names,
///   slot timing, periods, …
///
/// # Optional inputs (have defaults)
///
/// | Method              | Default                                           |
/// |---------------------|---------------------------------------------------|
/// | `.connectivity(m)`  | every link at `settings.baseline_pdr`             |
/// | `.positions(v)`     | every mote at `(0, 0)`                            |
///
/// # Example
///
/// ```rust,ignore
/// let mut links = ConnectivityMatrix::fully_connected(4, 1);
/// links.set_link(MoteId(0), MoteId(3), 0.0)?;
/// let mut sim = SimBuilder::new(settings).connectivity(links).build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder {
    settings:     Settings,
    connectivity: Option<ConnectivityMatrix>,
    positions:    Option<Vec<(f64, f64)>>,
}

impl SimBuilder {
    pub fn new(settings: Settings) -> Self {
        Self { settings, connectivity: None, positions: None }
    }

    /// Supply a hand-built connectivity matrix.  It must cover exactly
    /// `num_motes` motes and `num_channels` channels.
    pub fn connectivity(mut self, connectivity: ConnectivityMatrix) -> Self {
        self.connectivity = Some(connectivity);
        self
    }

    /// Supply mote positions (must be length `num_motes`).
    pub fn positions(mut self, positions: Vec<(f64, f64)>) -> Self {
        self.positions = Some(positions);
        self
    }

    /// Validate inputs, build topology, connectivity and motes, and queue one
    /// boot event per mote at ASN 0.
    ///
    /// Every configuration problem surfaces here, before any event runs.
    pub fn build(self) -> SimResult<Sim> {
        let settings = self.settings;
        settings.validate()?;
        let topology_kind = TopologyKind::parse_supported(&settings.topology)?;
        let objective: OfKind = settings.objective_function.parse()?;
        let num_motes = settings.num_motes as usize;

        let connectivity = match self.connectivity {
            Some(m) => {
                if m.num_motes() as usize != num_motes {
                    return Err(SimError::MoteCountMismatch {
                        expected: num_motes,
                        got:      m.num_motes() as usize,
                        what:     "connectivity matrix",
                    });
                }
                if m.num_channels() != settings.num_channels {
                    return Err(SimError::Config(format!(
                        "connectivity matrix has {} channels, settings ask for {}",
                        m.num_channels(),
                        settings.num_channels
                    )));
                }
                m
            }
            None => ConnectivityMatrix::new(settings.num_motes, settings.num_channels, settings.baseline_pdr)?,
        };

        let positions = match self.positions {
            Some(p) => {
                if p.len() != num_motes {
                    return Err(SimError::MoteCountMismatch {
                        expected: num_motes,
                        got:      p.len(),
                        what:     "positions",
                    });
                }
                p
            }
            None => vec![(0.0, 0.0); num_motes],
        };

        let mut rng = SimRng::new(settings.seed);
        let topology = Topology::create(topology_kind, settings.num_motes, &mut rng)?;

        let config = MoteConfig {
            slotframe_length: settings.slotframe_length,
            tx_queue_size:    settings.tx_queue_size,
            max_tx_retries:   settings.max_tx_retries,
            objective,
        };
        let motes: Vec<Mote> = positions
            .into_iter()
            .enumerate()
            .map(|(i, position)| {
                let id = MoteId(i as u32);
                let mut mote = Mote::new(id, config, MoteRng::new(settings.seed, id));
                mote.position = position;
                mote
            })
            .collect();

        let mut scheduler = EventScheduler::new();
        for mote in &motes {
            scheduler.schedule(Asn::ZERO, mote.id, Action::Boot)?;
        }

        info!(
            motes = num_motes,
            topology = %topology_kind,
            objective = %objective,
            seed = settings.seed,
            "run built"
        );

        Ok(Sim {
            clock: settings.clock(),
            tx_timers: vec![None; num_motes],
            settings,
            scheduler,
            topology,
            connectivity,
            motes,
            rng,
        })
    }
}
