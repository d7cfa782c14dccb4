pub mod slp;

use crate::common::config::SlpConfig;
use crate::ir::IrModule;
use crate::passes::slp::SlpStats;

/// Runs every optimization pass on the module and returns the SLP pass's
/// statistics (currently the only pass this crate implements).
pub fn run_passes(module: &mut IrModule, config: &SlpConfig) -> SlpStats {
    slp::run(module, config)
}
