use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::error::{Error, Result};
use crate::exchange::private::PrivateAccount;
use crate::model::constraints::WithdrawsConstraints;
use crate::model::monetary::MonetaryAmount;
use crate::model::order::TradeSyncPolicy;
use crate::model::wallet::Wallet;
use crate::model::withdraw::{DeliveredWithdrawInfo, WithdrawStatus};

#[derive(Copy, Clone, Debug)]
pub struct WithdrawOptions {
    pub sync_policy: TradeSyncPolicy,
}

enum PollState {
    CheckSender,
    CheckReceiver,
    #[allow(dead_code)]
    Terminate,
}

/// Drives a withdrawal from `source` to `destination`'s `wallet`. Under synchronous policy,
/// polls sender status to completion, then polls the destination for a matching deposit via the
/// closest-recent-deposit heuristic, sleeping `withdraw_refresh_time` between cycles. The loop
/// has no deadline of its own; the caller bounds it (e.g. with `tokio::time::timeout`).
#[instrument(skip(source, destination), fields(currency = %wallet.currency_code()))]
pub async fn execute(
    source: Arc<dyn PrivateAccount>,
    destination: Arc<dyn PrivateAccount>,
    gross_amount: MonetaryAmount,
    wallet: Wallet,
    options: WithdrawOptions,
    refresh_time: std::time::Duration,
) -> Result<DeliveredWithdrawInfo> {
    let initiated = source.launch_withdraw(gross_amount, wallet.clone()).await?;
    debug!(withdraw_id = %initiated.withdraw_id, "withdraw initiated");

    if matches!(options.sync_policy, TradeSyncPolicy::Asynchronous) {
        return Ok(DeliveredWithdrawInfo { initiated, received: None });
    }

    let mut state = PollState::CheckSender;
    let mut sent = None;

    loop {
        tokio::time::sleep(refresh_time).await;
        match state {
            PollState::CheckSender => {
                let constraints = WithdrawsConstraints::new().with_currency(wallet.currency_code());
                let withdraws = source.query_recent_withdraws(&constraints).await?;
                let found = withdraws.into_iter().find(|(id, _)| *id == initiated.withdraw_id);
                match found {
                    Some((_, info)) => {
                        if info.status.is_terminal_failure() {
                            return Err(Error::WithdrawFailed {
                                withdraw_id: initiated.withdraw_id.clone(),
                                reason: "sender reported failure".into(),
                            });
                        }
                        if matches!(info.status, WithdrawStatus::Success) {
                            debug!(withdraw_id = %initiated.withdraw_id, "sender confirmed emission");
                            sent = Some(info);
                            state = PollState::CheckReceiver;
                        }
                    }
                    None => warn!(withdraw_id = %initiated.withdraw_id, "withdraw not yet visible on sender"),
                }
            }
            PollState::CheckReceiver => {
                let sent_info = sent.expect("sent info must be set before entering CheckReceiver");
                let delivered = destination.query_withdraw_delivery(&initiated, &sent_info).await?;
                if delivered.received.is_some() {
                    debug!(withdraw_id = %initiated.withdraw_id, "deposit matched on destination");
                    return Ok(delivered);
                }
                sent = Some(sent_info);
            }
            PollState::Terminate => unreachable!("terminate is a return, not a looped state"),
        }
    }
}
