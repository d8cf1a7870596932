//! Canonical binary encoding of payment transactions.
//!
//! Fields are written in ascending (type code, field code) order, each behind
//! its field header. Blobs and account identifiers carry a variable length
//! prefix. Only the field set a command payment uses is supported.

use super::constants::{HASH_PREFIX_TX_ID, HASH_PREFIX_TX_SIGN};
use super::error::{XrplError, XrplResult};
use crate::domain::entities::{AccountAddress, Drops, Memo, TransactionType, TxHash};
use crate::domain::services::sha512_half;

const TYPE_UINT16: u8 = 1;
const TYPE_UINT32: u8 = 2;
const TYPE_AMOUNT: u8 = 6;
const TYPE_BLOB: u8 = 7;
const TYPE_ACCOUNT: u8 = 8;
const TYPE_OBJECT: u8 = 14;
const TYPE_ARRAY: u8 = 15;

const FIELD_TRANSACTION_TYPE: (u8, u8) = (TYPE_UINT16, 2);
const FIELD_FLAGS: (u8, u8) = (TYPE_UINT32, 2);
const FIELD_SEQUENCE: (u8, u8) = (TYPE_UINT32, 4);
const FIELD_DESTINATION_TAG: (u8, u8) = (TYPE_UINT32, 14);
const FIELD_LAST_LEDGER_SEQUENCE: (u8, u8) = (TYPE_UINT32, 27);
const FIELD_AMOUNT: (u8, u8) = (TYPE_AMOUNT, 1);
const FIELD_FEE: (u8, u8) = (TYPE_AMOUNT, 8);
const FIELD_SIGNING_PUB_KEY: (u8, u8) = (TYPE_BLOB, 3);
const FIELD_TXN_SIGNATURE: (u8, u8) = (TYPE_BLOB, 4);
const FIELD_MEMO_TYPE: (u8, u8) = (TYPE_BLOB, 12);
const FIELD_MEMO_DATA: (u8, u8) = (TYPE_BLOB, 13);
const FIELD_MEMO_FORMAT: (u8, u8) = (TYPE_BLOB, 14);
const FIELD_ACCOUNT: (u8, u8) = (TYPE_ACCOUNT, 1);
const FIELD_DESTINATION: (u8, u8) = (TYPE_ACCOUNT, 3);
const FIELD_MEMO: (u8, u8) = (TYPE_OBJECT, 10);
const FIELD_MEMOS: (u8, u8) = (TYPE_ARRAY, 9);

const OBJECT_END_MARKER: u8 = 0xE1;
const ARRAY_END_MARKER: u8 = 0xF1;

/// Positive native amount flag; the top bit is zero for XRP.
const AMOUNT_POSITIVE_BIT: u64 = 0x4000_0000_0000_0000;

const MAX_VL_LENGTH: usize = 918_744;

/// Autofilled payment ready for signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedTransaction {
    pub transaction_type: TransactionType,
    pub flags: u32,
    pub account: AccountAddress,
    pub destination: AccountAddress,
    pub amount: Drops,
    pub fee: Drops,
    pub sequence: u32,
    pub last_ledger_sequence: u32,
    pub destination_tag: Option<u32>,
    pub signing_pub_key: Vec<u8>,
    pub memos: Vec<Memo>,
}

/// Returns the bytes a signer signs: `STX\0` followed by the unsigned fields.
///
/// # Errors
/// Returns error if a field cannot be encoded.
pub fn signing_payload(tx: &PreparedTransaction) -> XrplResult<Vec<u8>> {
    let mut out = HASH_PREFIX_TX_SIGN.to_vec();
    out.extend(encode(tx, None)?);
    Ok(out)
}

/// Encodes the signed transaction blob.
///
/// # Errors
/// Returns error if a field cannot be encoded.
pub fn encode_signed(tx: &PreparedTransaction, signature: &[u8]) -> XrplResult<Vec<u8>> {
    encode(tx, Some(signature))
}

/// Computes the identifying hash of a signed blob.
#[must_use]
pub fn transaction_id(blob: &[u8]) -> TxHash {
    let mut data = HASH_PREFIX_TX_ID.to_vec();
    data.extend_from_slice(blob);
    TxHash::from_bytes(&sha512_half(&data))
}

struct Field {
    id: (u8, u8),
    bytes: Vec<u8>,
}

impl Field {
    fn new(id: (u8, u8), bytes: Vec<u8>) -> Self {
        Self { id, bytes }
    }

    fn blob(id: (u8, u8), data: &[u8]) -> XrplResult<Self> {
        let mut bytes = encode_vl_length(data.len())?;
        bytes.extend_from_slice(data);
        Ok(Self::new(id, bytes))
    }
}

fn write_fields(out: &mut Vec<u8>, mut fields: Vec<Field>) {
    fields.sort_by_key(|field| field.id);
    for field in fields {
        out.extend(field_header(field.id.0, field.id.1));
        out.extend(field.bytes);
    }
}

fn encode(tx: &PreparedTransaction, signature: Option<&[u8]>) -> XrplResult<Vec<u8>> {
    let mut fields = vec![
        Field::new(
            FIELD_TRANSACTION_TYPE,
            tx.transaction_type.code().to_be_bytes().to_vec(),
        ),
        Field::new(FIELD_FLAGS, tx.flags.to_be_bytes().to_vec()),
        Field::new(FIELD_SEQUENCE, tx.sequence.to_be_bytes().to_vec()),
        Field::new(
            FIELD_LAST_LEDGER_SEQUENCE,
            tx.last_ledger_sequence.to_be_bytes().to_vec(),
        ),
        Field::new(FIELD_AMOUNT, encode_amount(tx.amount)?.to_vec()),
        Field::new(FIELD_FEE, encode_amount(tx.fee)?.to_vec()),
        Field::blob(FIELD_SIGNING_PUB_KEY, &tx.signing_pub_key)?,
        Field::blob(FIELD_ACCOUNT, tx.account.account_id())?,
        Field::blob(FIELD_DESTINATION, tx.destination.account_id())?,
    ];

    if let Some(tag) = tx.destination_tag {
        fields.push(Field::new(FIELD_DESTINATION_TAG, tag.to_be_bytes().to_vec()));
    }
    if let Some(signature) = signature {
        fields.push(Field::blob(FIELD_TXN_SIGNATURE, signature)?);
    }
    if !tx.memos.is_empty() {
        fields.push(Field::new(FIELD_MEMOS, encode_memos(&tx.memos)?));
    }

    let mut out = Vec::with_capacity(256);
    write_fields(&mut out, fields);
    Ok(out)
}

fn encode_memos(memos: &[Memo]) -> XrplResult<Vec<u8>> {
    let mut out = Vec::new();
    for memo in memos {
        let mut inner = Vec::new();
        for (id, value) in [
            (FIELD_MEMO_TYPE, memo.memo_type_hex()),
            (FIELD_MEMO_DATA, memo.memo_data_hex()),
            (FIELD_MEMO_FORMAT, memo.memo_format_hex()),
        ] {
            if let Some(value) = value {
                let bytes = hex::decode(value)
                    .map_err(|e| XrplError::serialization(format!("memo is not hex: {e}")))?;
                inner.push(Field::blob(id, &bytes)?);
            }
        }

        out.extend(field_header(FIELD_MEMO.0, FIELD_MEMO.1));
        write_fields(&mut out, inner);
        out.push(OBJECT_END_MARKER);
    }
    out.push(ARRAY_END_MARKER);
    Ok(out)
}

/// Encodes a field header from its type and field codes.
#[must_use]
pub fn field_header(type_code: u8, field_code: u8) -> Vec<u8> {
    match (type_code < 16, field_code < 16) {
        (true, true) => vec![(type_code << 4) | field_code],
        (true, false) => vec![type_code << 4, field_code],
        (false, true) => vec![field_code, type_code],
        (false, false) => vec![0, type_code, field_code],
    }
}

/// Encodes a native amount.
///
/// # Errors
/// Returns error if the amount exceeds the XRP supply.
pub fn encode_amount(amount: Drops) -> XrplResult<[u8; 8]> {
    if amount > Drops::MAX {
        return Err(XrplError::serialization(format!(
            "amount of {amount} drops exceeds the maximum"
        )));
    }
    Ok((amount.get() | AMOUNT_POSITIVE_BIT).to_be_bytes())
}

/// Encodes the length prefix of a variable length field.
///
/// # Errors
/// Returns error if `len` does not fit the three byte form.
#[allow(clippy::cast_possible_truncation)]
pub fn encode_vl_length(len: usize) -> XrplResult<Vec<u8>> {
    if len <= 192 {
        Ok(vec![len as u8])
    } else if len <= 12_480 {
        let len = len - 193;
        Ok(vec![193 + (len >> 8) as u8, (len & 0xFF) as u8])
    } else if len <= MAX_VL_LENGTH {
        let len = len - 12_481;
        Ok(vec![
            241 + (len >> 16) as u8,
            ((len >> 8) & 0xFF) as u8,
            (len & 0xFF) as u8,
        ])
    } else {
        Err(XrplError::serialization(format!(
            "variable length field of {len} bytes is too long"
        )))
    }
}
