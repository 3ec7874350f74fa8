/// Status codes reported by the AVR TWI controller in slave mode
/// (TWSR with the prescaler bits masked off).
const TW_SR_SLA_ACK: u8 = 0x60; // SLA+W received, ACK returned
const TW_SR_GCALL_ACK: u8 = 0x70; // general call received, ACK returned
const TW_SR_DATA_ACK: u8 = 0x80; // data received after SLA+W, ACK returned
const TW_SR_DATA_NACK: u8 = 0x88; // data received after SLA+W, NACK returned
const TW_SR_GCALL_DATA_ACK: u8 = 0x90; // data received after general call, ACK returned
const TW_SR_GCALL_DATA_NACK: u8 = 0x98; // data received after general call, NACK returned
const TW_SR_STOP: u8 = 0xA0; // STOP or repeated START while addressed
const TW_ST_SLA_ACK: u8 = 0xA8; // SLA+R received, ACK returned
const TW_ST_DATA_ACK: u8 = 0xB8; // data transmitted, ACK received
const TW_ST_DATA_NACK: u8 = 0xC0; // data transmitted, NACK received
const TW_ST_LAST_DATA: u8 = 0xC8; // last byte transmitted (TWEA = 0), ACK received
const TW_BUS_ERROR: u8 = 0x00; // illegal START or STOP

/// Status bits of TWSR.
pub const STATUS_MASK: u8 = 0xF8;

/// Bus phase reported with a controller interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Addressed for writing, ACK returned.
    WriteAddressed,
    /// General call received, ACK returned.
    GeneralCall,
    /// Data byte received in a write, ACK returned.
    DataReceived,
    /// Data byte received in a write, NACK returned.
    DataReceivedNack,
    /// Data byte received after a general call, ACK returned.
    GeneralCallData,
    /// Data byte received after a general call, NACK returned.
    GeneralCallDataNack,
    /// STOP or repeated START while addressed.
    StopOrRestart,
    /// Addressed for reading, ACK returned.
    ReadAddressed,
    /// Byte sent, master wants more.
    ByteSentAck,
    /// Byte sent, master ended the read.
    ByteSentNack,
    /// Last byte sent but the master still acknowledged.
    LastByteSentAck,
    /// Illegal START or STOP condition.
    BusError,
    /// Any other status, including the arbitration-lost variants.
    Unknown(u8),
}

impl Status {
    /// Classify a raw TWSR value.
    pub const fn from_raw(raw: u8) -> Self {
        match raw & STATUS_MASK {
            TW_SR_SLA_ACK => Status::WriteAddressed,
            TW_SR_GCALL_ACK => Status::GeneralCall,
            TW_SR_DATA_ACK => Status::DataReceived,
            TW_SR_DATA_NACK => Status::DataReceivedNack,
            TW_SR_GCALL_DATA_ACK => Status::GeneralCallData,
            TW_SR_GCALL_DATA_NACK => Status::GeneralCallDataNack,
            TW_SR_STOP => Status::StopOrRestart,
            TW_ST_SLA_ACK => Status::ReadAddressed,
            TW_ST_DATA_ACK => Status::ByteSentAck,
            TW_ST_DATA_NACK => Status::ByteSentNack,
            TW_ST_LAST_DATA => Status::LastByteSentAck,
            TW_BUS_ERROR => Status::BusError,
            other => Status::Unknown(other),
        }
    }

    /// The status code the controller would report.
    pub const fn raw(self) -> u8 {
        match self {
            Status::WriteAddressed => TW_SR_SLA_ACK,
            Status::GeneralCall => TW_SR_GCALL_ACK,
            Status::DataReceived => TW_SR_DATA_ACK,
            Status::DataReceivedNack => TW_SR_DATA_NACK,
            Status::GeneralCallData => TW_SR_GCALL_DATA_ACK,
            Status::GeneralCallDataNack => TW_SR_GCALL_DATA_NACK,
            Status::StopOrRestart => TW_SR_STOP,
            Status::ReadAddressed => TW_ST_SLA_ACK,
            Status::ByteSentAck => TW_ST_DATA_ACK,
            Status::ByteSentNack => TW_ST_DATA_NACK,
            Status::LastByteSentAck => TW_ST_LAST_DATA,
            Status::BusError => TW_BUS_ERROR,
            Status::Unknown(raw) => raw,
        }
    }
}
