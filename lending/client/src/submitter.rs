use std::{sync::Arc, time::Duration};

use log::{debug, info, warn};
use solana_program::{instruction::Instruction, message::Message};
use solana_sdk::{commitment_config::CommitmentConfig, signature::Signature};
use tokio::time::{sleep, timeout};

use crate::{
    config::ClientConfig,
    error::{RejectReason, SubmitError},
    instruction::Operation,
    rpc::{ChainReader, WalletSigner},
};

/// Sign, send and confirm as one unit. Never retries or resubmits.
pub struct TransactionSubmitter<C: ChainReader + ?Sized> {
    chain: Arc<C>,
    commitment: CommitmentConfig,
    confirm_timeout: Duration,
    poll_interval: Duration,
}

impl<C: ChainReader + ?Sized> TransactionSubmitter<C> {
    pub fn new(chain: Arc<C>, config: &ClientConfig) -> Self {
        Self {
            chain,
            commitment: config.commitment.into(),
            confirm_timeout: config.confirm_timeout(),
            poll_interval: config.poll_interval(),
        }
    }

    pub async fn submit<W: WalletSigner + ?Sized>(
        &self,
        wallet: &W,
        operation: Operation,
        instructions: &[Instruction],
    ) -> Result<Signature, SubmitError> {
        let blockhash = self
            .chain
            .get_latest_blockhash()
            .await
            .map_err(|e| SubmitError::Transport(e.to_string()))?;

        let payer = wallet.pubkey();
        let message = Message::new_with_blockhash(instructions, Some(&payer), &blockhash);
        debug!(
            "{}: requesting signature from {} for {} instruction(s)",
            operation,
            payer,
            instructions.len()
        );

        let signature = wallet.sign_and_send(message).await.map_err(|e| {
            warn!("{} was not sent: {}", operation, e);
            SubmitError::from_wallet(operation, e)
        })?;
        info!("{} sent: {}", operation, signature);

        self.await_confirmation(operation, &signature).await?;
        info!("{} confirmed: {}", operation, signature);
        Ok(signature)
    }

    // Gives up after `confirm_timeout`; an abandoned wait is Unconfirmed, not failed
    async fn await_confirmation(
        &self,
        operation: Operation,
        signature: &Signature,
    ) -> Result<(), SubmitError> {
        let poll = async {
            loop {
                match self
                    .chain
                    .get_signature_status(signature, self.commitment)
                    .await
                {
                    Ok(Some(Ok(()))) => return Ok(()),
                    Ok(Some(Err(err))) => {
                        warn!("{} {} failed on chain: {}", operation, signature, err);
                        return Err(SubmitError::Rejected {
                            reason: RejectReason::decode(operation, err),
                        });
                    }
                    Ok(None) => {}
                    Err(e) => debug!("status poll for {} failed: {}", signature, e),
                }
                sleep(self.poll_interval).await;
            }
        };

        match timeout(self.confirm_timeout, poll).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "{} {} not confirmed after {:?}",
                    operation, signature, self.confirm_timeout
                );
                Err(SubmitError::Unconfirmed {
                    signature: *signature,
                })
            }
        }
    }
}
