use crate::builder::{CallBuilder, TransactionBuilder};
use crate::error::{BuilderError, ValidationError};
use crate::transaction::TransactionType;
use dotkit_codec::{Call, TransactionIntent};
use dotkit_primitives::{decode_hex, TypeRegistry};

/// `Utility.batch` / `Utility.batch_all` over already encoded calls.
#[derive(Debug, Clone, Default)]
pub struct BatchCall {
    calls: Vec<Vec<u8>>,
    atomic: bool,
}

pub type BatchTransactionBuilder = TransactionBuilder<BatchCall>;

impl BatchCall {
    pub fn set_calls<S: AsRef<str>>(&mut self, calls: &[S]) -> Result<(), ValidationError> {
        let mut decoded = Vec::with_capacity(calls.len());
        for (i, call) in calls.iter().enumerate() {
            let bytes = decode_hex(call.as_ref())
                .map_err(|_| ValidationError::new(format!("calls[{}]", i), "not a hex string"))?;
            if bytes.len() < 2 {
                return Err(ValidationError::new(format!("calls[{}]", i), "too short to be a call"));
            }
            decoded.push(bytes);
        }
        self.calls = decoded;
        Ok(())
    }

    pub fn set_atomic(&mut self, atomic: bool) {
        self.atomic = atomic;
    }
}

impl CallBuilder for BatchCall {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::Batch
    }

    fn validate(&self, registry: &TypeRegistry) -> Result<(), BuilderError> {
        if self.calls.is_empty() {
            return Err(ValidationError::required("calls").into());
        }
        // every sub-call must be fully understood
        for call in &self.calls {
            Call::decode_with(call, registry)?;
        }
        Ok(())
    }

    fn intent(&self) -> Result<TransactionIntent, BuilderError> {
        Ok(TransactionIntent::Batch {
            calls: self.calls.clone(),
            atomic: self.atomic,
        })
    }

    fn load_call(&mut self, call: &Call, registry: &TypeRegistry) -> Result<(), BuilderError> {
        let (calls, atomic) = match call {
            Call::Batch { calls } => (calls, false),
            Call::BatchAll { calls } => (calls, true),
            other => {
                return Err(BuilderError::InvalidTransaction(format!(
                    "{}.{} is not a batch",
                    other.pallet(),
                    other.method()
                )))
            }
        };
        let encoded = calls
            .iter()
            .map(|c| c.encode_with(registry).map(|bytes| format!("0x{}", hex::encode(bytes))))
            .collect::<Result<Vec<_>, _>>()?;
        self.set_calls(&encoded)?;
        self.set_atomic(atomic);
        Ok(())
    }
}

impl TransactionBuilder<BatchCall> {
    /// Hex encoded calls, executed in order.
    pub fn calls<S: AsRef<str>>(&mut self, calls: &[S]) -> Result<&mut Self, BuilderError> {
        self.kind.set_calls(calls)?;
        Ok(self)
    }

    /// `batch_all`: one failing call reverts the whole batch.
    pub fn atomic(&mut self, atomic: bool) -> Result<&mut Self, BuilderError> {
        self.kind.set_atomic(atomic);
        Ok(self)
    }
}
