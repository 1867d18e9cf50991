//! Transaction signing seam.

use forge_store::Utxo;
use forge_transactions::Transaction;

use crate::error::WalletError;

/// Signs every input of a transaction.
///
/// `spent` holds the outputs being spent, in input order, so the signer can
/// find the key that owns each one.
pub trait TxSigner: Send + Sync {
    fn sign(&self, tx: Transaction, spent: &[Utxo]) -> Result<Transaction, WalletError>;
}
