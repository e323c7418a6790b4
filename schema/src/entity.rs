//! Chain domain objects.
//!
//! These are plain structs with their own `to_bytes`/`from_bytes` pair rather
//! than codec values. [`EntityCodec`] adapts any [`Entity`] into a [`Codec`] so
//! they compose with the primitive codecs and with generated code.

use std::{fmt, marker::PhantomData};

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::{
    codec::{Codec, DynVec, FixVec, Opt, StructReader, StructWriter, TableReader, TableWriter},
    error::CodecError,
    hex_string::Hex,
    primitives::{BYTE, BYTE32, BYTE32_VEC, BYTES, BYTES_OPT, BYTES_VEC, UINT32, UINT64},
};

/// A domain object that knows its own molecule encoding.
pub trait Entity: Sized {
    const NAME: &'static str;

    fn to_bytes(&self) -> Result<Vec<u8>, CodecError>;

    fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError>;

    fn fixed_size() -> Option<usize> {
        None
    }
}

/// Adapts an [`Entity`] into the [`Codec`] shape.
pub struct EntityCodec<T>(PhantomData<fn() -> T>);

impl<T> EntityCodec<T> {
    pub const fn new() -> EntityCodec<T> {
        EntityCodec(PhantomData)
    }
}

impl<T> Clone for EntityCodec<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for EntityCodec<T> {}

impl<T> Default for EntityCodec<T> {
    fn default() -> Self {
        EntityCodec::new()
    }
}

impl<T: Entity> fmt::Debug for EntityCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityCodec<{}>", T::NAME)
    }
}

impl<T: Entity> Codec for EntityCodec<T> {
    type Value = T;

    fn encode(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        value.to_bytes()
    }

    fn decode(&self, bytes: &[u8]) -> Result<T, CodecError> {
        T::from_bytes(bytes)
    }

    fn fixed_size(&self) -> Option<usize> {
        T::fixed_size()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashType {
    #[default]
    Data,
    Type,
    Data1,
    Data2,
}

impl HashType {
    pub fn to_byte(self) -> u8 {
        match self {
            HashType::Data => 0,
            HashType::Type => 1,
            HashType::Data1 => 2,
            HashType::Data2 => 4,
        }
    }

    pub fn from_byte(tag: u8) -> Result<HashType, CodecError> {
        match tag {
            0 => Ok(HashType::Data),
            1 => Ok(HashType::Type),
            2 => Ok(HashType::Data1),
            4 => Ok(HashType::Data2),
            _ => Err(CodecError::InvalidTag { name: "HashType", tag }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DepType {
    #[default]
    Code,
    DepGroup,
}

impl DepType {
    pub fn to_byte(self) -> u8 {
        match self {
            DepType::Code => 0,
            DepType::DepGroup => 1,
        }
    }

    pub fn from_byte(tag: u8) -> Result<DepType, CodecError> {
        match tag {
            0 => Ok(DepType::Code),
            1 => Ok(DepType::DepGroup),
            _ => Err(CodecError::InvalidTag { name: "DepType", tag }),
        }
    }
}

/// A lock or type script: which code to run and the arguments it runs with.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Script {
    pub code_hash: Hex,
    pub hash_type: HashType,
    pub args:      Hex,
}

impl Entity for Script {
    const NAME: &'static str = "Script";

    fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        let mut writer = TableWriter::new(Self::NAME);
        writer.write(&BYTE32, &self.code_hash)?;
        writer.write(&BYTE, &self.hash_type.to_byte())?;
        writer.write(&BYTES, &self.args)?;
        writer.finish()
    }

    fn from_bytes(bytes: &[u8]) -> Result<Script, CodecError> {
        let reader = TableReader::new(Self::NAME, bytes, 3)?;
        Ok(Script {
            code_hash: reader.field(0, &BYTE32)?,
            hash_type: HashType::from_byte(reader.field(1, &BYTE)?)?,
            args:      reader.field(2, &BYTES)?,
        })
    }
}

/// A reference to a cell: the transaction that created it and the output index.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutPoint {
    pub tx_hash: Hex,
    pub index:   u32,
}

impl Entity for OutPoint {
    const NAME: &'static str = "OutPoint";

    fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        let mut writer = StructWriter::new(Self::NAME, 36);
        writer.write(&BYTE32, &self.tx_hash)?;
        writer.write(&UINT32, &self.index)?;
        writer.finish()
    }

    fn from_bytes(bytes: &[u8]) -> Result<OutPoint, CodecError> {
        let mut reader = StructReader::new(Self::NAME, bytes, 36)?;
        Ok(OutPoint {
            tx_hash: reader.read(&BYTE32)?,
            index:   reader.read(&UINT32)?,
        })
    }

    fn fixed_size() -> Option<usize> {
        Some(36)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellInput {
    pub since:           BigUint,
    pub previous_output: OutPoint,
}

impl Entity for CellInput {
    const NAME: &'static str = "CellInput";

    fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        let mut writer = StructWriter::new(Self::NAME, 44);
        writer.write(&UINT64, &self.since)?;
        writer.write(&OUT_POINT, &self.previous_output)?;
        writer.finish()
    }

    fn from_bytes(bytes: &[u8]) -> Result<CellInput, CodecError> {
        let mut reader = StructReader::new(Self::NAME, bytes, 44)?;
        Ok(CellInput {
            since:           reader.read(&UINT64)?,
            previous_output: reader.read(&OUT_POINT)?,
        })
    }

    fn fixed_size() -> Option<usize> {
        Some(44)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellOutput {
    pub capacity: BigUint,
    pub lock:     Script,
    #[serde(rename = "type")]
    pub type_:    Option<Script>,
}

impl Entity for CellOutput {
    const NAME: &'static str = "CellOutput";

    fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        let mut writer = TableWriter::new(Self::NAME);
        writer.write(&UINT64, &self.capacity)?;
        writer.write(&SCRIPT, &self.lock)?;
        writer.write(&SCRIPT_OPT, &self.type_)?;
        writer.finish()
    }

    fn from_bytes(bytes: &[u8]) -> Result<CellOutput, CodecError> {
        let reader = TableReader::new(Self::NAME, bytes, 3)?;
        Ok(CellOutput {
            capacity: reader.field(0, &UINT64)?,
            lock:     reader.field(1, &SCRIPT)?,
            type_:    reader.field(2, &SCRIPT_OPT)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellDep {
    pub out_point: OutPoint,
    pub dep_type:  DepType,
}

impl Entity for CellDep {
    const NAME: &'static str = "CellDep";

    fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        let mut writer = StructWriter::new(Self::NAME, 37);
        writer.write(&OUT_POINT, &self.out_point)?;
        writer.write(&BYTE, &self.dep_type.to_byte())?;
        writer.finish()
    }

    fn from_bytes(bytes: &[u8]) -> Result<CellDep, CodecError> {
        let mut reader = StructReader::new(Self::NAME, bytes, 37)?;
        Ok(CellDep {
            out_point: reader.read(&OUT_POINT)?,
            dep_type:  DepType::from_byte(reader.read(&BYTE)?)?,
        })
    }

    fn fixed_size() -> Option<usize> {
        Some(37)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransaction {
    pub version:      u32,
    pub cell_deps:    Vec<CellDep>,
    pub header_deps:  Vec<Hex>,
    pub inputs:       Vec<CellInput>,
    pub outputs:      Vec<CellOutput>,
    pub outputs_data: Vec<Hex>,
}

impl Entity for RawTransaction {
    const NAME: &'static str = "RawTransaction";

    fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        let mut writer = TableWriter::new(Self::NAME);
        writer.write(&UINT32, &self.version)?;
        writer.write(&CELL_DEP_VEC, &self.cell_deps)?;
        writer.write(&BYTE32_VEC, &self.header_deps)?;
        writer.write(&CELL_INPUT_VEC, &self.inputs)?;
        writer.write(&CELL_OUTPUT_VEC, &self.outputs)?;
        writer.write(&BYTES_VEC, &self.outputs_data)?;
        writer.finish()
    }

    fn from_bytes(bytes: &[u8]) -> Result<RawTransaction, CodecError> {
        let reader = TableReader::new(Self::NAME, bytes, 6)?;
        Ok(RawTransaction {
            version:      reader.field(0, &UINT32)?,
            cell_deps:    reader.field(1, &CELL_DEP_VEC)?,
            header_deps:  reader.field(2, &BYTE32_VEC)?,
            inputs:       reader.field(3, &CELL_INPUT_VEC)?,
            outputs:      reader.field(4, &CELL_OUTPUT_VEC)?,
            outputs_data: reader.field(5, &BYTES_VEC)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub raw:       RawTransaction,
    pub witnesses: Vec<Hex>,
}

impl Entity for Transaction {
    const NAME: &'static str = "Transaction";

    fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        let mut writer = TableWriter::new(Self::NAME);
        writer.write(&RAW_TRANSACTION, &self.raw)?;
        writer.write(&BYTES_VEC, &self.witnesses)?;
        writer.finish()
    }

    fn from_bytes(bytes: &[u8]) -> Result<Transaction, CodecError> {
        let reader = TableReader::new(Self::NAME, bytes, 2)?;
        Ok(Transaction {
            raw:       reader.field(0, &RAW_TRANSACTION)?,
            witnesses: reader.field(1, &BYTES_VEC)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WitnessArgs {
    pub lock:        Option<Hex>,
    pub input_type:  Option<Hex>,
    pub output_type: Option<Hex>,
}

impl Entity for WitnessArgs {
    const NAME: &'static str = "WitnessArgs";

    fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        let mut writer = TableWriter::new(Self::NAME);
        writer.write(&BYTES_OPT, &self.lock)?;
        writer.write(&BYTES_OPT, &self.input_type)?;
        writer.write(&BYTES_OPT, &self.output_type)?;
        writer.finish()
    }

    fn from_bytes(bytes: &[u8]) -> Result<WitnessArgs, CodecError> {
        let reader = TableReader::new(Self::NAME, bytes, 3)?;
        Ok(WitnessArgs {
            lock:        reader.field(0, &BYTES_OPT)?,
            input_type:  reader.field(1, &BYTES_OPT)?,
            output_type: reader.field(2, &BYTES_OPT)?,
        })
    }
}

pub type ScriptCodec = EntityCodec<Script>;
pub type ScriptOptCodec = Opt<ScriptCodec>;
pub type ScriptVecCodec = DynVec<ScriptCodec>;
pub type OutPointCodec = EntityCodec<OutPoint>;
pub type OutPointVecCodec = FixVec<OutPointCodec>;
pub type CellInputCodec = EntityCodec<CellInput>;
pub type CellInputVecCodec = FixVec<CellInputCodec>;
pub type CellOutputCodec = EntityCodec<CellOutput>;
pub type CellOutputVecCodec = DynVec<CellOutputCodec>;
pub type CellDepCodec = EntityCodec<CellDep>;
pub type CellDepVecCodec = FixVec<CellDepCodec>;
pub type RawTransactionCodec = EntityCodec<RawTransaction>;
pub type TransactionCodec = EntityCodec<Transaction>;
pub type WitnessArgsCodec = EntityCodec<WitnessArgs>;

pub const SCRIPT: ScriptCodec = EntityCodec::new();
pub const SCRIPT_OPT: ScriptOptCodec = Opt(SCRIPT);
pub const SCRIPT_VEC: ScriptVecCodec = DynVec(SCRIPT);
pub const OUT_POINT: OutPointCodec = EntityCodec::new();
pub const OUT_POINT_VEC: OutPointVecCodec = FixVec(OUT_POINT);
pub const CELL_INPUT: CellInputCodec = EntityCodec::new();
pub const CELL_INPUT_VEC: CellInputVecCodec = FixVec(CELL_INPUT);
pub const CELL_OUTPUT: CellOutputCodec = EntityCodec::new();
pub const CELL_OUTPUT_VEC: CellOutputVecCodec = DynVec(CELL_OUTPUT);
pub const CELL_DEP: CellDepCodec = EntityCodec::new();
pub const CELL_DEP_VEC: CellDepVecCodec = FixVec(CELL_DEP);
pub const RAW_TRANSACTION: RawTransactionCodec = EntityCodec::new();
pub const TRANSACTION: TransactionCodec = EntityCodec::new();
pub const WITNESS_ARGS: WitnessArgsCodec = EntityCodec::new();

#[cfg(test)]
fn zero_hash() -> Hex {
    format!("0x{}", "00".repeat(32))
}

#[test]
fn script_layout() {
    let script = Script {
        code_hash: zero_hash(),
        hash_type: HashType::Type,
        args:      "0x".to_string(),
    };
    let bytes = SCRIPT.encode(&script).unwrap();
    assert_eq!(bytes.len(), 53);
    assert_eq!(&bytes[..16], &[53, 0, 0, 0, 16, 0, 0, 0, 48, 0, 0, 0, 49, 0, 0, 0]);
    assert_eq!(bytes[48], 1);
    assert_eq!(SCRIPT.decode(&bytes), Ok(script));
}

#[test]
fn script_rejects_unknown_hash_type() {
    let script = Script { code_hash: zero_hash(), hash_type: HashType::Data2, args: "0x".to_string() };
    let mut bytes = SCRIPT.encode(&script).unwrap();
    bytes[48] = 3;
    assert_eq!(SCRIPT.decode(&bytes), Err(CodecError::InvalidTag { name: "HashType", tag: 3 }));
}

#[test]
fn fixed_entities_report_their_size() {
    assert_eq!(OUT_POINT.fixed_size(), Some(36));
    assert_eq!(CELL_INPUT.fixed_size(), Some(44));
    assert_eq!(CELL_DEP.fixed_size(), Some(37));
    assert_eq!(SCRIPT.fixed_size(), None);

    let input = CellInput {
        since:           BigUint::from(7u32),
        previous_output: OutPoint { tx_hash: zero_hash(), index: 2 },
    };
    let bytes = CELL_INPUT.encode(&input).unwrap();
    assert_eq!(&bytes[..8], &[7, 0, 0, 0, 0, 0, 0, 0]);
    assert_eq!(&bytes[40..], &[2, 0, 0, 0]);
    assert_eq!(CELL_INPUT.decode(&bytes), Ok(input));
}

#[test]
fn empty_witness_args() {
    let bytes = WITNESS_ARGS.encode(&WitnessArgs::default()).unwrap();
    assert_eq!(bytes, vec![16, 0, 0, 0, 16, 0, 0, 0, 16, 0, 0, 0, 16, 0, 0, 0]);
    assert_eq!(WITNESS_ARGS.decode(&bytes), Ok(WitnessArgs::default()));
}

#[test]
fn transaction_round_trip() {
    let lock = Script { code_hash: zero_hash(), hash_type: HashType::Type, args: "0x0102".to_string() };
    let tx = Transaction {
        raw: RawTransaction {
            version:      0,
            cell_deps:    vec![CellDep {
                out_point: OutPoint { tx_hash: zero_hash(), index: 0 },
                dep_type:  DepType::DepGroup,
            }],
            header_deps:  vec![],
            inputs:       vec![CellInput {
                since:           BigUint::default(),
                previous_output: OutPoint { tx_hash: zero_hash(), index: 1 },
            }],
            outputs:      vec![CellOutput { capacity: BigUint::from(6_100_000_000u64), lock: lock.clone(), type_: Some(lock) }],
            outputs_data: vec!["0x".to_string()],
        },
        witnesses: vec![],
    };
    let bytes = TRANSACTION.encode(&tx).unwrap();
    assert_eq!(TRANSACTION.decode(&bytes), Ok(tx));
}

#[test]
fn entities_serialize_with_chain_field_names() {
    let output = CellOutput { capacity: BigUint::from(1u8), lock: Script::default(), type_: None };
    let json = serde_json::to_value(&output).unwrap();
    assert_eq!(json["type"], serde_json::Value::Null);
    assert_eq!(json["lock"]["hashType"], "data");
    assert_eq!(json["lock"]["codeHash"], "");
}

#[test]
fn capacity_and_since_use_the_full_uint64_range() {
    let lock = Script { code_hash: zero_hash(), hash_type: HashType::Data, args: "0x".to_string() };
    let output = CellOutput { capacity: BigUint::from(u64::MAX), lock, type_: None };
    let bytes = CELL_OUTPUT.encode(&output).unwrap();
    assert_eq!(CELL_OUTPUT.decode(&bytes), Ok(output));

    let input = CellInput { since: BigUint::from(u64::MAX) + 1u8, previous_output: OutPoint::default() };
    assert_eq!(CELL_INPUT.encode(&input), Err(CodecError::IntegerOverflow { bytes: 8 }));
}
