use alloc::vec::Vec;

use argmin::core::observers::ObserverMode;
use argmin::core::{Executor, State};
use argmin::solver::linesearch::MoreThuenteLineSearch;
use argmin::solver::quasinewton::LBFGS;
use argmin_observer_slog::SlogLogger;
use slog::{info, o, Discard, Drain, Logger};

use crate::config::TrainConfig;
use crate::errors::{GroupDecayError, Result};
use crate::group::{group_parameters, ParameterGroups};
use crate::layout::ParameterLayout;
use crate::model::TrainedParams;
use crate::penalty::{DecayedLoss, Objective};

const LBFGS_MEMORY: usize = 7;

/// Trainer applying per-group decay
#[cfg_attr(docsrs, doc(cfg(feature = "train")))]
pub struct Trainer {
    config: TrainConfig,
    logger: Logger,
}

impl Trainer {
    /// Creates a new trainer.
    ///
    /// Messages go to the terminal if the configuration is verbose, and are discarded
    /// otherwise.
    pub fn new(config: TrainConfig) -> Self {
        let logger = if config.is_verbose() {
            term_logger()
        } else {
            Logger::root(Discard, o!())
        };
        Self { config, logger }
    }

    /// Replaces the logger
    pub fn logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    /// Gets the configuration
    pub const fn config(&self) -> &TrainConfig {
        &self.config
    }

    /// Groups the parameters of the layout and reports the optimizer setup.
    pub fn optimizer_groups(&self, layout: &ParameterLayout) -> Result<ParameterGroups> {
        let policy = self.config.decay_policy()?;
        let groups = group_parameters(layout.params(), &policy)?;
        info!(
            self.logger,
            "optimizer: LBFGS(m={}) with parameter groups {}", LBFGS_MEMORY, groups
        );
        Ok(groups)
    }

    /// Starts training from `init` and returns the best weights found.
    ///
    /// # Errors
    ///
    /// `init` must have one value per weight of a non-empty layout.
    pub fn train<O>(
        &self,
        layout: &ParameterLayout,
        objective: &O,
        init: Vec<f64>,
    ) -> Result<TrainedParams>
    where
        O: Objective,
    {
        if layout.is_empty() {
            return Err(GroupDecayError::invalid_argument("layout must not be empty"));
        }
        if init.len() != layout.n_weights() {
            return Err(GroupDecayError::invalid_argument(
                "init must have one value per weight",
            ));
        }

        info!(
            self.logger, "starting training";
            "data" => self.config.data(),
            "epochs" => self.config.get_epochs(),
            "imgsz" => self.config.get_imgsz(),
            "batch" => self.config.get_batch(),
        );
        let groups = self.optimizer_groups(layout)?;
        let loss_function = DecayedLoss::new(objective, layout, &groups)?;

        let linesearch = MoreThuenteLineSearch::new()
            .with_c(1e-4, 0.9)
            .map_err(GroupDecayError::solver)?;
        let solver = LBFGS::new(linesearch, LBFGS_MEMORY);
        let mut executor = Executor::new(loss_function, solver)
            .configure(|state| state.param(init).max_iters(self.config.get_epochs()));
        if self.config.is_verbose() {
            executor = executor.add_observer(SlogLogger::term(), ObserverMode::Always);
        }
        let res = executor.run().map_err(GroupDecayError::solver)?;

        let state = res.state();
        let weights = state
            .get_best_param()
            .cloned()
            .ok_or_else(|| GroupDecayError::solver("solver returned no weights"))?;
        info!(
            self.logger, "finished training";
            "iters" => state.get_iter(),
            "cost" => state.get_best_cost(),
        );

        Ok(TrainedParams {
            layout: layout.clone(),
            weights,
        })
    }
}

fn term_logger() -> Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    Logger::root(drain, o!())
}
