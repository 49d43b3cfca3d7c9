//! Board snapshots serialized as JSON, as exported by a host application that
//! already holds the board in memory.

use crate::error::ExportError;
use crate::types::Board;

pub fn parse(data: &[u8]) -> Result<Board, ExportError> {
    Ok(serde_json::from_slice(data)?)
}

pub fn to_json(board: &Board, pretty: bool) -> Result<String, ExportError> {
    let json = if pretty {
        serde_json::to_string_pretty(board)?
    } else {
        serde_json::to_string(board)?
    };
    Ok(json)
}
