//! # Governance Requests
//!
//! Proposals and ballots are special-command packages sent by computor
//! operators. Both share one 600-byte frame:
//!
//! ```text
//! offset  size  field
//! 0       8     header (size 600, type 255, dejaVu = 3 random bytes + 0xFF)
//! 8       8     nonce: (command 3 << 56) | unix seconds
//! 16      2     computor index
//! 18      6     padding
//! 24      1     proposal URI length (0 for ballots)
//! 25      255   proposal URI
//! 280     256   proposal: reserved / ballot: 1 pad byte, then vote bits
//! 536     64    signature over bytes 8..536
//! ```
//!
//! Votes are packed 3 bits per computor, least significant bit first.

use crate::config::{
    HEADER_SIZE, NUMBER_OF_COMPUTORS, SET_PROPOSAL_AND_BALLOT_REQUEST_SIZE, SIGNATURE_LENGTH,
};
use crate::core::builder::PackageBuilder;
use crate::core::header::RequestResponseHeader;
use crate::core::wire::ensure_size;
use crate::crypto::{Crypto, Hasher, KeyPair, Signer};
use crate::error::{constants, ProtocolError, Result};
use crate::protocol::package_type::PackageType;
use bytes::Bytes;
use rand::Rng;
use std::borrow::Cow;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Special command code for setting a proposal or ballot.
pub const SPECIAL_COMMAND_SET_PROPOSAL_AND_BALLOT_REQUEST: u64 = 3;

/// Total package size, header included.
pub const GOVERNANCE_PACKAGE_SIZE: usize = HEADER_SIZE + SET_PROPOSAL_AND_BALLOT_REQUEST_SIZE;

pub const MAX_PROPOSAL_URI_LENGTH: usize = 255;

/// Largest vote value representable in 3 bits.
pub const MAX_VOTE: u8 = 0b111;

const BITS_PER_VOTE: usize = 3;
const RESERVED_SIZE: usize = 256;
const SIGNED_BODY_SIZE: usize = SET_PROPOSAL_AND_BALLOT_REQUEST_SIZE - SIGNATURE_LENGTH;

/// Offset of the URI-length byte within the body.
const URI_LENGTH_OFFSET: usize = 8 + 2 + 6;

/// Pack votes 3 bits each, least significant bit first.
pub fn votes_to_bytes(votes: &[u8]) -> Result<Vec<u8>> {
    if votes.len() > NUMBER_OF_COMPUTORS {
        return Err(ProtocolError::capacity(
            "ballot votes",
            NUMBER_OF_COMPUTORS,
            votes.len(),
        ));
    }
    if let Some(position) = votes.iter().position(|v| *v > MAX_VOTE) {
        return Err(ProtocolError::InvalidFormat(Cow::Owned(format!(
            "vote for computor {position} does not fit in 3 bits"
        ))));
    }

    let bit_count = votes.len() * BITS_PER_VOTE;
    let mut out = vec![0u8; bit_count.div_ceil(8)];
    for (computor, vote) in votes.iter().enumerate() {
        for bit in 0..BITS_PER_VOTE {
            if (vote >> bit) & 1 == 1 {
                let position = computor * BITS_PER_VOTE + bit;
                out[position / 8] |= 1 << (position % 8);
            }
        }
    }
    Ok(out)
}

fn special_command_header() -> Result<RequestResponseHeader> {
    let random: [u8; 3] = rand::rng().random();
    let dejavu = u32::from_le_bytes([random[0], random[1], random[2], 0xFF]);
    Ok(RequestResponseHeader::new(
        PackageType::ProcessSpecialCommand,
        SET_PROPOSAL_AND_BALLOT_REQUEST_SIZE,
    )?
    .with_dejavu(dejavu))
}

fn unix_seconds() -> Result<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|_| ProtocolError::Custom(constants::ERR_SYSTEM_TIME.to_string()))
}

fn nonce(unix_seconds: u64) -> u64 {
    (SPECIAL_COMMAND_SET_PROPOSAL_AND_BALLOT_REQUEST << 56) | unix_seconds
}

/// Frame an unsigned body: sign it, then prefix the header.
fn finish<H: Hasher, S: Signer>(
    crypto: &Crypto<H, S>,
    keys: &KeyPair,
    mut body: PackageBuilder,
) -> Result<Bytes> {
    body.pad(SIGNED_BODY_SIZE.saturating_sub(body.len()));
    debug_assert_eq!(body.len(), SIGNED_BODY_SIZE);
    let signed = body.sign_with(crypto, keys);

    let header = special_command_header()?;
    let mut out = PackageBuilder::with_capacity(GOVERNANCE_PACKAGE_SIZE);
    out.add(&header).add_raw(&signed.data);
    Ok(out.into_bytes())
}

fn body_prefix(unix_seconds: u64, computor_index: u16) -> PackageBuilder {
    let mut body = PackageBuilder::with_capacity(SET_PROPOSAL_AND_BALLOT_REQUEST_SIZE);
    body.add_u64(nonce(unix_seconds)).add_u16(computor_index).pad(6);
    debug_assert_eq!(body.len(), URI_LENGTH_OFFSET);
    body
}

/// Signed proposal package pointing at `uri`.
pub fn proposal_package<H: Hasher, S: Signer>(
    crypto: &Crypto<H, S>,
    operator_seed: &str,
    computor_index: u16,
    uri: &str,
) -> Result<Bytes> {
    proposal_package_at(crypto, operator_seed, computor_index, uri, unix_seconds()?)
}

/// [`proposal_package`] with an explicit nonce timestamp.
pub fn proposal_package_at<H: Hasher, S: Signer>(
    crypto: &Crypto<H, S>,
    operator_seed: &str,
    computor_index: u16,
    uri: &str,
    unix_seconds: u64,
) -> Result<Bytes> {
    let uri = uri.as_bytes();
    if uri.len() > MAX_PROPOSAL_URI_LENGTH {
        return Err(ProtocolError::capacity(
            "proposal URI",
            MAX_PROPOSAL_URI_LENGTH,
            uri.len(),
        ));
    }
    let keys = crypto.key_pair(operator_seed, 0)?;

    let mut body = body_prefix(unix_seconds, computor_index);
    body.add_u8(uri.len() as u8)
        .add_raw(uri)
        .pad(MAX_PROPOSAL_URI_LENGTH - uri.len())
        .pad(RESERVED_SIZE);

    debug!(computor_index, uri_length = uri.len(), "Proposal package built");
    finish(crypto, &keys, body)
}

/// One signed ballot package per computor index, all carrying `votes`.
pub fn ballot_packages<H: Hasher, S: Signer>(
    crypto: &Crypto<H, S>,
    operator_seed: &str,
    computor_indices: &[u16],
    votes: &[u8],
) -> Result<Vec<Bytes>> {
    ballot_packages_at(crypto, operator_seed, computor_indices, votes, unix_seconds()?)
}

/// [`ballot_packages`] with an explicit nonce timestamp.
pub fn ballot_packages_at<H: Hasher, S: Signer>(
    crypto: &Crypto<H, S>,
    operator_seed: &str,
    computor_indices: &[u16],
    votes: &[u8],
    unix_seconds: u64,
) -> Result<Vec<Bytes>> {
    let vote_bytes = votes_to_bytes(votes)?;
    let keys = crypto.key_pair(operator_seed, 0)?;

    computor_indices
        .iter()
        .map(|&computor_index| {
            let mut body = body_prefix(unix_seconds, computor_index);
            body.add_u8(0)
                .pad(MAX_PROPOSAL_URI_LENGTH)
                .pad(1)
                .add_raw(&vote_bytes);
            debug!(computor_index, votes = votes.len(), "Ballot package built");
            finish(crypto, &keys, body)
        })
        .collect()
}

/// Split a governance package into its header, signed region and signature.
pub fn split_governance_package(data: &[u8]) -> Result<(RequestResponseHeader, &[u8], &[u8])> {
    ensure_size("GovernancePackage", GOVERNANCE_PACKAGE_SIZE, data.len())?;
    let header = RequestResponseHeader::peek(data)?;
    let signed_end = HEADER_SIZE + SIGNED_BODY_SIZE;
    Ok((header, &data[HEADER_SIZE..signed_end], &data[signed_end..]))
}
