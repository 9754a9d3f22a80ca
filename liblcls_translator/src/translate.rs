//! Per-type decode routines and the dispatch table binding them to native
//! type identifiers.
//!
//! Every registered native type has exactly one entry here. Discovery of
//! categories silently skips unregistered types, but once decoding is
//! requested a missing entry is fatal: silently mis-decoding detector data is
//! worse than stopping the run.

use fxhash::FxHashMap;

use super::constants::{MCP_CAMERA_SHAPE, ONAXIS_CAMERA_SHAPE};
use super::error::TranslateError;
use super::native::{EventKey, NativeData, NativeTypeId};
use super::physics::PhotonEnergy;
use super::record::{add_record, RecordMap, RecordValue, Unit};
use super::registry::SourceRegistry;

/// A pure decode routine: one native item in, records out
pub type DecodeFn =
    fn(&EventKey, &NativeData, &SourceRegistry, &mut RecordMap) -> Result<(), TranslateError>;

/// Dispatch table keyed by native type identifier.
///
/// Adding a detector type is one insertion here plus its registry entry.
#[derive(Default)]
pub struct DecodeTable {
    table: FxHashMap<NativeTypeId, DecodeFn>,
}

impl DecodeTable {
    pub fn new() -> Self {
        let mut table = DecodeTable::default();
        table.insert(NativeTypeId::BldDataFeeGasDetEnergy, decode_gas_det_energy);
        table.insert(NativeTypeId::BldDataFeeGasDetEnergyV1, decode_gas_det_energy);
        table.insert(NativeTypeId::LusiIpmFexV1, decode_ipm_fex);
        table.insert(NativeTypeId::CameraFrameV1, decode_camera);
        table.insert(NativeTypeId::BldDataEBeamV1, decode_ebeam);
        table.insert(NativeTypeId::BldDataEBeamV2, decode_ebeam);
        table.insert(NativeTypeId::BldDataEBeamV3, decode_ebeam);
        table.insert(NativeTypeId::BldDataEBeamV4, decode_ebeam);
        table.insert(NativeTypeId::BldDataEBeamV5, decode_ebeam);
        table.insert(NativeTypeId::BldDataEBeamV6, decode_ebeam);
        table.insert(NativeTypeId::BldDataEBeamV7, decode_ebeam);
        table.insert(NativeTypeId::CsPadDataV2, decode_cspad);
        table.insert(NativeTypeId::CsPad2x2ElementV1, decode_cspad2x2);
        table.insert(NativeTypeId::PnccdFullFrameV1, decode_pnccd_full_frame);
        table.insert(NativeTypeId::PnccdFramesV1, decode_pnccd_frames);
        table.insert(NativeTypeId::AcqirisDataDescV1, decode_acqiris);
        table.insert(NativeTypeId::EventId, decode_event_id);
        table.insert(NativeTypeId::EvrDataV3, decode_event_codes);
        table.insert(NativeTypeId::EvrDataV4, decode_event_codes);
        table
    }

    fn insert(&mut self, type_id: NativeTypeId, decode: DecodeFn) {
        self.table.insert(type_id, decode);
    }

    /// Decode routine for a native type; an unregistered type is fatal
    pub fn decoder_for(&self, type_id: NativeTypeId) -> Result<DecodeFn, TranslateError> {
        self.table
            .get(&type_id)
            .copied()
            .ok_or(TranslateError::UnsupportedType(type_id))
    }
}

fn payload_mismatch(key: &EventKey) -> TranslateError {
    TranslateError::PayloadMismatch {
        type_id: key.type_id,
        key: key.to_string(),
    }
}

/// Gas monitor detector energies, four channels in mJ
fn decode_gas_det_energy(
    key: &EventKey,
    data: &NativeData,
    _sources: &SourceRegistry,
    values: &mut RecordMap,
) -> Result<(), TranslateError> {
    let NativeData::GasDetEnergy { f_11, f_12, f_21, f_22 } = data else {
        return Err(payload_mismatch(key));
    };
    add_record(values, "f_11_ENRC", RecordValue::Scalar(*f_11), Unit::Millijoule);
    add_record(values, "f_12_ENRC", RecordValue::Scalar(*f_12), Unit::Millijoule);
    add_record(values, "f_21_ENRC", RecordValue::Scalar(*f_21), Unit::Millijoule);
    add_record(values, "f_22_ENRC", RecordValue::Scalar(*f_22), Unit::Millijoule);
    Ok(())
}

/// Intensity-position monitor relative pulse energy
fn decode_ipm_fex(
    key: &EventKey,
    data: &NativeData,
    _sources: &SourceRegistry,
    values: &mut RecordMap,
) -> Result<(), TranslateError> {
    let NativeData::IpmFex { sum } = data else {
        return Err(payload_mismatch(key));
    };
    let name = format!("IpmFex - {}", key.source);
    add_record(values, &name, RecordValue::Scalar(*sum), Unit::Adu);
    Ok(())
}

/// Photon energy from the e-beam record, direct when available, otherwise
/// derived from the beam parameters
fn decode_ebeam(
    key: &EventKey,
    data: &NativeData,
    _sources: &SourceRegistry,
    values: &mut RecordMap,
) -> Result<(), TranslateError> {
    let NativeData::EBeam {
        photon_energy,
        peak_current,
        l3_energy,
    } = data
    else {
        return Err(payload_mismatch(key));
    };
    let resolved = match photon_energy {
        Some(ev) => PhotonEnergy::Direct(*ev),
        None => PhotonEnergy::Derived {
            peak_current: *peak_current,
            l3_energy: *l3_energy,
        },
    };
    add_record(
        values,
        "photonEnergy",
        RecordValue::Scalar(resolved.in_ev()),
        Unit::Electronvolt,
    );
    Ok(())
}

/// Camera frames are named by sensor shape where the shape is unambiguous
fn decode_camera(
    key: &EventKey,
    data: &NativeData,
    sources: &SourceRegistry,
    values: &mut RecordMap,
) -> Result<(), TranslateError> {
    let NativeData::CameraFrame(frame) = data else {
        return Err(payload_mismatch(key));
    };
    let name = match frame.dim() {
        MCP_CAMERA_SHAPE => "mcp",
        ONAXIS_CAMERA_SHAPE => "onAxis",
        _ => sources.detector_name_or_source(&key.source),
    };
    add_record(values, name, RecordValue::Frame(frame.mapv(i32::from)), Unit::Adu);
    Ok(())
}

/// CsPad decodes quad by quad
fn decode_cspad(
    key: &EventKey,
    data: &NativeData,
    sources: &SourceRegistry,
    values: &mut RecordMap,
) -> Result<(), TranslateError> {
    let NativeData::CsPad { quads } = data else {
        return Err(payload_mismatch(key));
    };
    let detector = sources.detector_name_or_source(&key.source);
    for (quad, frame) in quads.iter().enumerate() {
        let name = format!("{}Quad{}", detector, quad);
        add_record(values, &name, RecordValue::Frame(frame.mapv(i32::from)), Unit::Adu);
    }
    Ok(())
}

fn decode_cspad2x2(
    key: &EventKey,
    data: &NativeData,
    _sources: &SourceRegistry,
    values: &mut RecordMap,
) -> Result<(), TranslateError> {
    let NativeData::CsPad2x2(frame) = data else {
        return Err(payload_mismatch(key));
    };
    add_record(values, "CsPad2x2", RecordValue::Frame(frame.mapv(i32::from)), Unit::Adu);
    Ok(())
}

fn decode_pnccd_full_frame(
    key: &EventKey,
    data: &NativeData,
    sources: &SourceRegistry,
    values: &mut RecordMap,
) -> Result<(), TranslateError> {
    let NativeData::PnccdFullFrame(frame) = data else {
        return Err(payload_mismatch(key));
    };
    let name = format!("{}fullFrame", sources.detector_name_or_source(&key.source));
    add_record(values, &name, RecordValue::Frame(frame.mapv(i32::from)), Unit::Adu);
    Ok(())
}

fn decode_pnccd_frames(
    key: &EventKey,
    data: &NativeData,
    sources: &SourceRegistry,
    values: &mut RecordMap,
) -> Result<(), TranslateError> {
    let NativeData::PnccdFrames(frames) = data else {
        return Err(payload_mismatch(key));
    };
    let detector = sources.detector_name_or_source(&key.source);
    for (index, frame) in frames.iter().enumerate() {
        let name = format!("{}Frame{}", detector, index);
        add_record(values, &name, RecordValue::Frame(frame.mapv(i32::from)), Unit::Adu);
    }
    Ok(())
}

/// Time-of-flight traces, channel by channel, scaled to volts with an
/// explicit time axis
fn decode_acqiris(
    key: &EventKey,
    data: &NativeData,
    sources: &SourceRegistry,
    values: &mut RecordMap,
) -> Result<(), TranslateError> {
    let NativeData::Acqiris { channels } = data else {
        return Err(payload_mismatch(key));
    };
    let detector = sources.detector_name_or_source(&key.source);
    for (channel, desc) in channels.iter().enumerate() {
        if desc.samples.is_empty() {
            spdlog::warn!("TOF data for detector {} channel {} is missing", detector, channel);
        }
        let name = format!("{} Channel {}", detector, channel);
        add_record(
            values,
            &name,
            RecordValue::Trace {
                samples: desc.voltages(),
                times: desc.sample_times(),
            },
            Unit::Volt,
        );
    }
    Ok(())
}

fn decode_event_id(
    key: &EventKey,
    data: &NativeData,
    _sources: &SourceRegistry,
    values: &mut RecordMap,
) -> Result<(), TranslateError> {
    let NativeData::EventId(id) = data else {
        return Err(payload_mismatch(key));
    };
    add_record(values, "Timestamp", RecordValue::Timestamp(*id), Unit::Second);
    Ok(())
}

fn decode_event_codes(
    key: &EventKey,
    data: &NativeData,
    _sources: &SourceRegistry,
    values: &mut RecordMap,
) -> Result<(), TranslateError> {
    let NativeData::EvrCodes(codes) = data else {
        return Err(payload_mismatch(key));
    };
    add_record(
        values,
        "EvrEventCodes",
        RecordValue::Codes(codes.clone()),
        Unit::Dimensionless,
    );
    Ok(())
}
