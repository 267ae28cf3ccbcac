use crate::domain::entities::AvalRecord;
use crate::domain::errors::SerializationError;
use crate::ports::outbound::RecordSerializer;

/// Default record serializer using bincode.
#[derive(Default)]
pub struct BincodeRecordSerializer;

impl RecordSerializer for BincodeRecordSerializer {
    fn serialize(&self, record: &AvalRecord) -> Result<Vec<u8>, SerializationError> {
        bincode::serialize(record).map_err(|e| SerializationError {
            message: e.to_string(),
        })
    }

    fn deserialize(&self, data: &[u8]) -> Result<AvalRecord, SerializationError> {
        bincode::deserialize(data).map_err(|e| SerializationError {
            message: e.to_string(),
        })
    }
}
