//! Fixed numeric constants used by the decode routines.

/// LTU wake loss per ampere of peak current (MeV/A)
pub const LTU_WAKE_LOSS_PER_AMP: f64 = 0.0016293;
/// Spontaneous radiation loss per undulator segment per GeV of beam energy (MeV/GeV)
pub const SR_LOSS_PER_SEGMENT_PER_GEV: f64 = 0.63;
/// Wake loss in one undulator segment per ampere of peak current (MeV/A)
pub const UNDULATOR_WAKE_LOSS_PER_AMP: f64 = 0.0003;
/// Coefficient relating the squared beam energy (GeV) in the first active
/// undulator segment to the resonant photon energy (eV)
pub const RESONANT_ENERGY_COEFF_EV: f64 = 44.42;
/// MeV -> GeV
pub const GEV_PER_MEV: f64 = 0.001;

/// Sensor shape of the MCP camera (pnCCD replacement)
pub const MCP_CAMERA_SHAPE: (usize, usize) = (1024, 1024);
/// Sensor shape of the on-axis Questar camera
pub const ONAXIS_CAMERA_SHAPE: (usize, usize) = (1752, 2336);
