//! Package type codes carried in the header's type byte.

/// Known package types. Codes without a named variant are preserved as
/// [`PackageType::Unknown`] and forwarded untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageType {
    ExchangePublicPeers,
    BroadcastMessage,
    BroadcastComputors,
    BroadcastTick,
    BroadcastFutureTickData,
    RequestComputors,
    RequestQuorumTick,
    RequestTickData,
    BroadcastTransaction,
    RequestCurrentTickInfo,
    RespondCurrentTickInfo,
    RequestTickTransactions,
    RequestEntity,
    RespondEntity,
    RequestContractIpo,
    RespondContractIpo,
    EndResponse,
    ProcessSpecialCommand,
    Unknown(u8),
}

impl PackageType {
    pub fn code(self) -> u8 {
        match self {
            PackageType::ExchangePublicPeers => 0,
            PackageType::BroadcastMessage => 1,
            PackageType::BroadcastComputors => 2,
            PackageType::BroadcastTick => 3,
            PackageType::BroadcastFutureTickData => 8,
            PackageType::RequestComputors => 11,
            PackageType::RequestQuorumTick => 14,
            PackageType::RequestTickData => 16,
            PackageType::BroadcastTransaction => 24,
            PackageType::RequestCurrentTickInfo => 27,
            PackageType::RespondCurrentTickInfo => 28,
            PackageType::RequestTickTransactions => 29,
            PackageType::RequestEntity => 31,
            PackageType::RespondEntity => 32,
            PackageType::RequestContractIpo => 33,
            PackageType::RespondContractIpo => 34,
            PackageType::EndResponse => 35,
            PackageType::ProcessSpecialCommand => 255,
            PackageType::Unknown(code) => code,
        }
    }

    /// Human-readable name used in log fields.
    pub fn name(self) -> &'static str {
        match self {
            PackageType::ExchangePublicPeers => "EXCHANGE_PUBLIC_PEERS",
            PackageType::BroadcastMessage => "BROADCAST_MESSAGE",
            PackageType::BroadcastComputors => "BROADCAST_COMPUTORS",
            PackageType::BroadcastTick => "BROADCAST_TICK",
            PackageType::BroadcastFutureTickData => "BROADCAST_FUTURE_TICK_DATA",
            PackageType::RequestComputors => "REQUEST_COMPUTORS",
            PackageType::RequestQuorumTick => "REQUEST_QUORUM_TICK",
            PackageType::RequestTickData => "REQUEST_TICK_DATA",
            PackageType::BroadcastTransaction => "BROADCAST_TRANSACTION",
            PackageType::RequestCurrentTickInfo => "REQUEST_CURRENT_TICK_INFO",
            PackageType::RespondCurrentTickInfo => "RESPOND_CURRENT_TICK_INFO",
            PackageType::RequestTickTransactions => "REQUEST_TICK_TRANSACTIONS",
            PackageType::RequestEntity => "REQUEST_ENTITY",
            PackageType::RespondEntity => "RESPOND_ENTITY",
            PackageType::RequestContractIpo => "REQUEST_CONTRACT_IPO",
            PackageType::RespondContractIpo => "RESPOND_CONTRACT_IPO",
            PackageType::EndResponse => "END_RESPONSE",
            PackageType::ProcessSpecialCommand => "PROCESS_SPECIAL_COMMAND",
            PackageType::Unknown(_) => "UNKNOWN",
        }
    }
}

impl From<u8> for PackageType {
    fn from(code: u8) -> Self {
        match code {
            0 => PackageType::ExchangePublicPeers,
            1 => PackageType::BroadcastMessage,
            2 => PackageType::BroadcastComputors,
            3 => PackageType::BroadcastTick,
            8 => PackageType::BroadcastFutureTickData,
            11 => PackageType::RequestComputors,
            14 => PackageType::RequestQuorumTick,
            16 => PackageType::RequestTickData,
            24 => PackageType::BroadcastTransaction,
            27 => PackageType::RequestCurrentTickInfo,
            28 => PackageType::RespondCurrentTickInfo,
            29 => PackageType::RequestTickTransactions,
            31 => PackageType::RequestEntity,
            32 => PackageType::RespondEntity,
            33 => PackageType::RequestContractIpo,
            34 => PackageType::RespondContractIpo,
            35 => PackageType::EndResponse,
            255 => PackageType::ProcessSpecialCommand,
            other => PackageType::Unknown(other),
        }
    }
}

impl From<PackageType> for u8 {
    fn from(package_type: PackageType) -> Self {
        package_type.code()
    }
}
