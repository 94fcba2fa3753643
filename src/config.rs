/*
 * This modules contains the `EvalConfig` struct, which implements the default trait. This config
 * can be passed to `evaluate` or `evaluate_texts` to simplify their arguments.
*/
use crate::metrics::DivByZeroStrat;
use crate::reporter::DEFAULT_DIGITS;
use either::Either as LeftOrRight;
use std::fmt::Display;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
/// Config struct used to simplify the inputs of the evaluation. It implements the default trait.
pub struct EvalConfig {
    /// This parameter describe what to do when we encounter a division by zero when computing
    /// precision and recall. The most common solution is to replace the results by 0.
    pub(crate) zero_division: DivByZeroStrat,
    /// Number of decimals of the displayed report.
    pub(crate) digits: usize,
    /// Can we use multiple cores to compute the metrics? In practice, the label sequences are
    /// rarely long enough for this to pay off.
    pub(crate) parallel: bool,
}

impl EvalConfig {
    pub fn new() -> Self {
        Self {
            zero_division: DivByZeroStrat::ReplaceBy0,
            digits: DEFAULT_DIGITS,
            parallel: false,
        }
    }
    pub fn zero_division(&self) -> DivByZeroStrat {
        self.zero_division
    }
    pub fn digits(&self) -> usize {
        self.digits
    }
    pub fn parallel(&self) -> bool {
        self.parallel
    }
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<(DivByZeroStrat, usize, bool)> for EvalConfig {
    fn from(value: (DivByZeroStrat, usize, bool)) -> Self {
        Self {
            zero_division: value.0,
            digits: value.1,
            parallel: value.2,
        }
    }
}

impl From<EvalConfig> for (DivByZeroStrat, usize, bool) {
    fn from(value: EvalConfig) -> Self {
        (value.zero_division, value.digits, value.parallel)
    }
}

impl<ZeroDiv> From<EvalConfigBuilder<ZeroDiv>> for EvalConfig
where
    ZeroDiv: Into<DivByZeroStrat>,
{
    fn from(value: EvalConfigBuilder<ZeroDiv>) -> Self {
        Self {
            zero_division: value.zero_division.either_into(),
            digits: value.digits,
            parallel: value.parallel,
        }
    }
}

impl Display for EvalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Strategy when encountering a division by zero: {:?}\n Number of decimals: {}\n Using parallel computations: {}",
            self.zero_division, self.digits, self.parallel
        )
    }
}

/// This builder can be used to build and customize an `EvalConfig` stucture.
pub struct EvalConfigBuilder<ZeroDiv>
where
    ZeroDiv: Into<DivByZeroStrat>,
{
    zero_division: LeftOrRight<ZeroDiv, DivByZeroStrat>,
    digits: usize,
    parallel: bool,
}

impl Default for EvalConfigBuilder<DivByZeroStrat> {
    fn default() -> Self {
        Self::new()
    }
}

impl<ZeroDiv> EvalConfigBuilder<ZeroDiv>
where
    ZeroDiv: Into<DivByZeroStrat>,
{
    pub fn division_by_zero(mut self, division_by_zero: ZeroDiv) -> Self {
        self.zero_division = LeftOrRight::Left(division_by_zero);
        self
    }
    pub fn digits(mut self, digits: usize) -> Self {
        self.digits = digits;
        self
    }
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
    pub fn new() -> Self {
        Self {
            zero_division: LeftOrRight::Right(DivByZeroStrat::ReplaceBy0),
            digits: DEFAULT_DIGITS,
            parallel: false,
        }
    }
    pub fn build(self) -> EvalConfig {
        EvalConfig::from(self)
    }
}
