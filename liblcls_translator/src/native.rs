use ndarray::{Array1, Array2};

/// The closed set of native data types the facility library can hand back.
///
/// Each shot's worth of data is addressed by (type, source, key) triples; this
/// enum is the type part. The set is fixed by the facility data formats, so
/// adding a detector type means adding a variant here and an entry in the
/// type registry and decode table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeTypeId {
    BldDataFeeGasDetEnergy,
    BldDataFeeGasDetEnergyV1,
    LusiIpmFexV1,
    CameraFrameV1,
    BldDataEBeamV1,
    BldDataEBeamV2,
    BldDataEBeamV3,
    BldDataEBeamV4,
    BldDataEBeamV5,
    BldDataEBeamV6,
    BldDataEBeamV7,
    CsPadDataV2,
    CsPad2x2ElementV1,
    PnccdFullFrameV1,
    PnccdFramesV1,
    AcqirisDataDescV1,
    EventId,
    EvrDataV3,
    EvrDataV4,
    /// Encoder box readout. Present in some runs but not translated.
    UsdUsbDataV1,
}

impl std::fmt::Display for NativeTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::BldDataFeeGasDetEnergy => "Bld.BldDataFEEGasDetEnergy",
            Self::BldDataFeeGasDetEnergyV1 => "Bld.BldDataFEEGasDetEnergyV1",
            Self::LusiIpmFexV1 => "Lusi.IpmFexV1",
            Self::CameraFrameV1 => "Camera.FrameV1",
            Self::BldDataEBeamV1 => "Bld.BldDataEBeamV1",
            Self::BldDataEBeamV2 => "Bld.BldDataEBeamV2",
            Self::BldDataEBeamV3 => "Bld.BldDataEBeamV3",
            Self::BldDataEBeamV4 => "Bld.BldDataEBeamV4",
            Self::BldDataEBeamV5 => "Bld.BldDataEBeamV5",
            Self::BldDataEBeamV6 => "Bld.BldDataEBeamV6",
            Self::BldDataEBeamV7 => "Bld.BldDataEBeamV7",
            Self::CsPadDataV2 => "CsPad.DataV2",
            Self::CsPad2x2ElementV1 => "CsPad2x2.ElementV1",
            Self::PnccdFullFrameV1 => "PNCCD.FullFrameV1",
            Self::PnccdFramesV1 => "PNCCD.FramesV1",
            Self::AcqirisDataDescV1 => "Acqiris.DataDescV1",
            Self::EventId => "EventId",
            Self::EvrDataV3 => "EvrData.DataV3",
            Self::EvrDataV4 => "EvrData.DataV4",
            Self::UsdUsbDataV1 => "UsdUsb.DataV1",
        };
        write!(f, "{}", name)
    }
}

/// Coarse time plus the 360 Hz fiducial counter, identifying one shot.
///
/// This is the unit of indexed access: a prebuilt run index maps these stamps
/// to file offsets inside the facility library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventTime {
    pub seconds: u32,
    pub nanoseconds: u32,
    pub fiducial: u32,
}

impl EventTime {
    pub fn new(seconds: u32, nanoseconds: u32, fiducial: u32) -> Self {
        Self {
            seconds,
            nanoseconds,
            fiducial,
        }
    }

    /// Unpack a 64-bit stamp (seconds in the high word, nanoseconds in the low)
    pub fn from_packed(packed: u64, fiducial: u32) -> Self {
        Self {
            seconds: (packed >> 32) as u32,
            nanoseconds: packed as u32,
            fiducial,
        }
    }

    /// Pack to the 64-bit stamp used by the run index
    pub fn packed(&self) -> u64 {
        (u64::from(self.seconds) << 32) | u64::from(self.nanoseconds)
    }
}

/// Address of one item inside a native event: type + source + optional key string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventKey {
    pub type_id: NativeTypeId,
    pub source: String,
    pub key: String,
}

impl EventKey {
    pub fn new(type_id: NativeTypeId, source: &str, key: &str) -> Self {
        Self {
            type_id,
            source: source.to_string(),
            key: key.to_string(),
        }
    }
}

impl std::fmt::Display for EventKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})[{}]", self.type_id, self.source, self.key)
    }
}

/// One digitizer channel of a time-of-flight trace, bundled with the
/// digitizer settings needed to convert raw counts to volts.
#[derive(Debug, Clone, PartialEq)]
pub struct AcqirisChannel {
    pub samples: Vec<i16>,
    /// Volts per raw count
    pub slope: f64,
    /// Vertical offset in volts
    pub offset: f64,
    /// Seconds between samples
    pub sample_interval: f64,
    /// Trigger time of the first sample in seconds
    pub trigger_time: f64,
}

/// The full event identifier carried by every shot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventIdData {
    pub seconds: u32,
    pub nanoseconds: u32,
    pub fiducial: u32,
    pub run: i32,
    pub ticks: u32,
    pub vector: u32,
}

impl EventIdData {
    /// Floating-point timestamp in seconds since the epoch
    pub fn as_seconds(&self) -> f64 {
        f64::from(self.seconds) + f64::from(self.nanoseconds) * 1e-9
    }

    /// 64-bit packed timestamp, seconds in the high word
    pub fn packed(&self) -> u64 {
        (u64::from(self.seconds) << 32) | u64::from(self.nanoseconds)
    }
}

/// Decoded payload of one native item, tagged by the type that produced it.
///
/// The facility library owns the raw bytes; a binding decodes them into one of
/// these variants before handing them to the translator.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeData {
    GasDetEnergy {
        f_11: f64,
        f_12: f64,
        f_21: f64,
        f_22: f64,
    },
    IpmFex {
        sum: f64,
    },
    EBeam {
        /// Direct photon energy reading in eV, present in newer beamline data
        photon_energy: Option<f64>,
        /// Peak current at BC2 in amperes
        peak_current: f64,
        /// L3 beam energy in MeV
        l3_energy: f64,
    },
    CameraFrame(Array2<u16>),
    CsPad {
        quads: Vec<Array2<i16>>,
    },
    CsPad2x2(Array2<i16>),
    PnccdFullFrame(Array2<u16>),
    PnccdFrames(Vec<Array2<u16>>),
    Acqiris {
        channels: Vec<AcqirisChannel>,
    },
    EventId(EventIdData),
    EvrCodes(Vec<u16>),
}

impl AcqirisChannel {
    /// Convert the raw counts to a voltage trace
    pub fn voltages(&self) -> Array1<f64> {
        Array1::from_vec(
            self.samples
                .iter()
                .map(|&s| f64::from(s) * self.slope - self.offset)
                .collect(),
        )
    }

    /// Sample times relative to the digitizer trigger
    pub fn sample_times(&self) -> Array1<f64> {
        Array1::from_vec(
            (0..self.samples.len())
                .map(|n| self.trigger_time + self.sample_interval * n as f64)
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_time_packing() {
        let time = EventTime::new(1_600_000_000, 123_456_789, 51966);
        let packed = time.packed();
        let unpacked = EventTime::from_packed(packed, 51966);
        assert_eq!(time, unpacked);
        assert_eq!(packed >> 32, 1_600_000_000);
    }

    #[test]
    fn test_event_id_encodings_share_stamp() {
        let id = EventIdData {
            seconds: 1000,
            nanoseconds: 500_000_000,
            fiducial: 12,
            run: 85,
            ticks: 0,
            vector: 0,
        };
        assert_eq!(id.as_seconds(), 1000.5);
        assert_eq!(id.packed(), (1000u64 << 32) | 500_000_000);
    }

    #[test]
    fn test_acqiris_voltage_conversion() {
        let channel = AcqirisChannel {
            samples: vec![0, 1, 2],
            slope: 0.5,
            offset: 0.25,
            sample_interval: 1e-9,
            trigger_time: 1e-6,
        };
        let volts = channel.voltages();
        assert_eq!(volts[0], -0.25);
        assert_eq!(volts[1], 0.25);
        assert_eq!(volts[2], 0.75);
        let times = channel.sample_times();
        assert_eq!(times[0], 1e-6);
        assert_eq!(times[2], 1e-6 + 2e-9);
    }
}
