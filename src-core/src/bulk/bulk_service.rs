use log::{info, warn};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashSet;

use crate::bulk::bulk_model::{BulkCreateRequest, BulkOperationResult, BulkOutcome, CopyMonthRequest};
use crate::errors::{Error, Result, ValidationError};
use crate::targets::allocation_generator::round_amount;
use crate::targets::targets_model::NewMonthlyTarget;
use crate::targets::targets_service::TargetService;
use crate::targets::targets_traits::TargetRepositoryTrait;

impl<T: TargetRepositoryTrait> TargetService<T> {
    /// Create `new_target` and optionally generate its allocations, as one bulk item
    async fn create_bulk_item(&self, new_target: NewMonthlyTarget, generate: bool) -> BulkOutcome {
        let branch_id = new_target.branch_id.clone();
        match self.insert_new_target(new_target).await {
            Ok(target) => {
                let allocation_error = if generate {
                    match self.regenerate(&target.id).await {
                        Ok(_) => None,
                        Err(e) => {
                            warn!(
                                "Target {} for branch {} created but allocation failed: {}",
                                target.id, branch_id, e
                            );
                            Some(e.to_string())
                        }
                    }
                } else {
                    None
                };
                BulkOutcome::Created {
                    target_id: target.id,
                    allocation_error,
                }
            }
            Err(e @ Error::DuplicateTarget { .. }) => {
                info!("Skipping branch {}: {}", branch_id, e);
                BulkOutcome::Skipped {
                    reason: e.to_string(),
                }
            }
            Err(e) => {
                warn!("Bulk item for branch {} failed: {}", branch_id, e);
                BulkOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    pub(crate) async fn run_bulk_create(&self, request: BulkCreateRequest) -> Result<BulkOperationResult> {
        let known: HashSet<String> = self
            .target_repo
            .load_branches()?
            .into_iter()
            .map(|b| b.id)
            .collect();

        let mut result = BulkOperationResult::default();
        let mut seen = HashSet::new();
        for branch_id in &request.branch_ids {
            if !seen.insert(branch_id.as_str()) {
                result.record(
                    branch_id,
                    BulkOutcome::Skipped {
                        reason: "duplicate in request".to_string(),
                    },
                );
                continue;
            }
            if !known.contains(branch_id) {
                result.record(
                    branch_id,
                    BulkOutcome::Failed {
                        reason: Error::not_found("Branch", branch_id).to_string(),
                    },
                );
                continue;
            }
            let Some(amount) = request.amount_for(branch_id) else {
                result.record(
                    branch_id,
                    BulkOutcome::Failed {
                        reason: format!("No target amount given for branch {}", branch_id),
                    },
                );
                continue;
            };

            let new_target = NewMonthlyTarget {
                branch_id: branch_id.clone(),
                year_month: request.year_month,
                target_amount: amount,
                profile_id: request.profile_id.clone(),
                notes: request.notes.clone(),
            };
            let outcome = self
                .create_bulk_item(new_target, request.generate_allocations)
                .await;
            result.record(branch_id, outcome);
        }

        info!("Bulk create for {}: {}", request.year_month, result.summary());
        Ok(result)
    }

    pub(crate) async fn run_copy_from_month(&self, request: CopyMonthRequest) -> Result<BulkOperationResult> {
        if request.source_month == request.destination_month {
            return Err(ValidationError::field(
                "destinationMonth",
                format!("cannot copy {} onto itself", request.source_month),
            )
            .into());
        }

        let factor = Decimal::ONE + request.adjustment_percent / dec!(100);
        let mut sources = self.target_repo.load_targets_for_month(request.source_month)?;
        sources.sort_by(|a, b| a.branch_id.cmp(&b.branch_id));

        let mut result = BulkOperationResult::default();
        for source in sources {
            let amount = round_amount(source.target_amount * factor, self.config.amount_scale);
            let new_target = NewMonthlyTarget {
                branch_id: source.branch_id.clone(),
                year_month: request.destination_month,
                target_amount: amount,
                profile_id: source.profile_id.clone(),
                notes: Some(format!(
                    "Copied from {} with {}% adjustment",
                    request.source_month, request.adjustment_percent
                )),
            };
            let outcome = self
                .create_bulk_item(new_target, request.generate_allocations)
                .await;
            result.record(&source.branch_id, outcome);
        }

        info!(
            "Copied targets {} -> {} at {}%: {}",
            request.source_month,
            request.destination_month,
            request.adjustment_percent,
            result.summary()
        );
        Ok(result)
    }
}
