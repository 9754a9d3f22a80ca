// The facility addresses data by native type and source; downstream analysis
// wants semantic names. Both directions live here as static tables built by
// plain insertion, so supporting a new detector is one entry in each table
// (plus its decode routine).

use std::str::FromStr;

use fxhash::FxHashMap;

use super::error::RegistryError;
use super::native::NativeTypeId;

/// Facility-agnostic semantic bucket that native types map into.
///
/// `Parameters` and `Analysis` are pseudo-categories: they are always listed
/// for every event. `Parameters` is served by the EPICS dict and `Analysis`
/// is an empty slot the downstream pipeline fills in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    PulseEnergies,
    PhotonEnergies,
    PhotonPixelDetectors,
    Camera,
    IonTofs,
    EventId,
    EventCodes,
    Parameters,
    Analysis,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PulseEnergies => "pulseEnergies",
            Self::PhotonEnergies => "photonEnergies",
            Self::PhotonPixelDetectors => "photonPixelDetectors",
            Self::Camera => "camera",
            Self::IonTofs => "ionTOFs",
            Self::EventId => "eventID",
            Self::EventCodes => "eventCodes",
            Self::Parameters => "parameters",
            Self::Analysis => "analysis",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = RegistryError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pulseEnergies" => Ok(Self::PulseEnergies),
            "photonEnergies" => Ok(Self::PhotonEnergies),
            "photonPixelDetectors" => Ok(Self::PhotonPixelDetectors),
            "camera" => Ok(Self::Camera),
            "ionTOFs" => Ok(Self::IonTofs),
            "eventID" => Ok(Self::EventId),
            "eventCodes" => Ok(Self::EventCodes),
            "parameters" => Ok(Self::Parameters),
            "analysis" => Ok(Self::Analysis),
            _ => Err(RegistryError::InvalidCategory(s.to_string())),
        }
    }
}

/// Static mapping between native type identifiers and semantic categories.
///
/// A native type with no entry is silently omitted from category discovery;
/// the decode table is the layer that treats missing routines as fatal.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    n2c: FxHashMap<NativeTypeId, Category>,
    c2n: FxHashMap<Category, Vec<NativeTypeId>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        let mut registry = TypeRegistry::default();
        registry.insert(NativeTypeId::BldDataFeeGasDetEnergy, Category::PulseEnergies);
        registry.insert(NativeTypeId::BldDataFeeGasDetEnergyV1, Category::PulseEnergies);
        registry.insert(NativeTypeId::LusiIpmFexV1, Category::PulseEnergies);
        registry.insert(NativeTypeId::CameraFrameV1, Category::Camera);
        registry.insert(NativeTypeId::BldDataEBeamV1, Category::PhotonEnergies);
        registry.insert(NativeTypeId::BldDataEBeamV2, Category::PhotonEnergies);
        registry.insert(NativeTypeId::BldDataEBeamV3, Category::PhotonEnergies);
        registry.insert(NativeTypeId::BldDataEBeamV4, Category::PhotonEnergies);
        registry.insert(NativeTypeId::BldDataEBeamV5, Category::PhotonEnergies);
        registry.insert(NativeTypeId::BldDataEBeamV6, Category::PhotonEnergies);
        registry.insert(NativeTypeId::BldDataEBeamV7, Category::PhotonEnergies);
        registry.insert(NativeTypeId::CsPadDataV2, Category::PhotonPixelDetectors);
        registry.insert(NativeTypeId::CsPad2x2ElementV1, Category::PhotonPixelDetectors);
        registry.insert(NativeTypeId::PnccdFullFrameV1, Category::PhotonPixelDetectors);
        registry.insert(NativeTypeId::PnccdFramesV1, Category::PhotonPixelDetectors);
        registry.insert(NativeTypeId::AcqirisDataDescV1, Category::IonTofs);
        registry.insert(NativeTypeId::EventId, Category::EventId);
        registry.insert(NativeTypeId::EvrDataV3, Category::EventCodes);
        registry.insert(NativeTypeId::EvrDataV4, Category::EventCodes);
        registry
    }

    fn insert(&mut self, type_id: NativeTypeId, category: Category) {
        self.n2c.insert(type_id, category);
        self.c2n.entry(category).or_default().push(type_id);
    }

    /// Category for a native type, None if the type is not registered
    pub fn category_of(&self, type_id: NativeTypeId) -> Option<Category> {
        self.n2c.get(&type_id).copied()
    }

    /// All native types feeding one category
    pub fn native_types(&self, category: Category) -> &[NativeTypeId] {
        self.c2n.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Static mapping from native source identifiers to human-readable detector names
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    s2c: FxHashMap<&'static str, &'static str>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        let mut registry = SourceRegistry::default();
        // CXI cameras
        registry.insert("DetInfo(CxiEndstation.0:Opal4000.1)", "Sc2Questar");
        registry.insert("DetInfo(CxiEndstation.0.Opal11000.0)", "Sc2Offaxis");
        // CXI CsPads
        registry.insert("DetInfo(CxiDs1.0:Cspad.0)", "CsPad Ds1");
        registry.insert("DetInfo(CxiDsd.0:Cspad.0)", "CsPad Dsd");
        registry.insert("DetInfo(CxiDs2.0:Cspad.0)", "CsPad Ds2");
        registry.insert("DetInfo(CxiDg3.0:Cspad2x2.0)", "CsPad Dg3");
        registry.insert("DetInfo(CxiDg2.0:Cspad2x2.0)", "CsPad Dg2");
        // AMO pnCCDs
        registry.insert("DetInfo(Camp.0:pnCCD.1)", "pnccdBack");
        registry.insert("DetInfo(Camp.0:pnCCD.0)", "pnccdFront");
        // ToF digitizers
        registry.insert("DetInfo(AmoEndstation.0:Acqiris.0)", "Acqiris 0");
        registry.insert("DetInfo(AmoEndstation.0:Acqiris.1)", "Acqiris 1");
        registry.insert("DetInfo(AmoEndstation.0:Acqiris.2)", "Acqiris 2");
        registry.insert("DetInfo(AmoETOF.0:Acqiris.0)", "Acqiris 0");
        registry.insert("DetInfo(AmoETOF.0:Acqiris.1)", "Acqiris 1");
        registry.insert("DetInfo(AmoITOF.0:Acqiris.0)", "Acqiris 2");
        registry.insert("DetInfo(AmoITOF.0:Acqiris.1)", "Acqiris 3");
        // MCP camera
        registry.insert("DetInfo(AmoEndstation.0:Opal1000.1)", "OPAL1");
        // CXI digitizers
        registry.insert("DetInfo(CxiEndstation.0:Acqiris.0)", "Acqiris 0");
        registry.insert("DetInfo(CxiEndstation.0:Acqiris.1)", "Acqiris 1");
        registry
    }

    fn insert(&mut self, source: &'static str, name: &'static str) {
        self.s2c.insert(source, name);
    }

    /// Detector name for a native source identifier
    pub fn detector_name(&self, source: &str) -> Option<&'static str> {
        self.s2c.get(source).copied()
    }

    /// Detector name, falling back to the raw source identifier
    pub fn detector_name_or_source<'a>(&self, source: &'a str) -> &'a str {
        self.detector_name(source).unwrap_or(source)
    }
}
