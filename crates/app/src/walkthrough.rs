//! The household-insurance walkthrough run by the binary.

use chrono::{DateTime, Utc};
use domain::{
    ContractData, ContractId, Customer, CustomerId, Money, PaymentMethod, PaymentType, Plan,
    PlanId,
};

use crate::App;
use crate::error::Result;

/// What the walkthrough did, for reporting.
#[derive(Debug, Clone)]
pub struct WalkthroughReport {
    pub plan: Plan,
    pub active_while_launched: Vec<PlanId>,
    pub active_after_retirement: Vec<PlanId>,
    /// Contract of a customer with a payment method on file.
    pub paying_contract: ContractId,
    /// Contract of a customer without one; its payment cannot be created.
    pub unconfigured_contract: ContractId,
}

/// Runs the plan lifecycle and opens two contracts on the plan.
///
/// The plan is launched at `launch_at` and retired at `retire_at`. Payment
/// creation happens asynchronously; call [`App::drain`] before inspecting
/// payments.
#[tracing::instrument(skip(app))]
pub async fn household_insurance(
    app: &App,
    launch_at: DateTime<Utc>,
    retire_at: DateTime<Utc>,
) -> Result<WalkthroughReport> {
    let plan = app.plans.create("household insurance").await?;
    app.plans.launch(plan.id(), launch_at).await?;

    let midpoint = launch_at + (retire_at - launch_at) / 2;
    let active_while_launched = active_ids(app, midpoint).await;

    app.quoting
        .set_monthly_rate(plan.id(), Money::from_cents(2_450));

    let paying = CustomerId::new();
    app.customers.insert(Customer::new(paying, "Alex Example"));
    app.payment_methods.configure(
        paying,
        PaymentMethod::Card {
            last_four: "4242".to_string(),
        },
    );
    let unconfigured = CustomerId::new();
    app.customers
        .insert(Customer::new(unconfigured, "Sam Example"));

    let paying_contract = app
        .contracts
        .open(ContractData::new(
            paying,
            plan.id(),
            PaymentType::Monthly,
            launch_at,
        ))
        .await?
        .id();
    let unconfigured_contract = app
        .contracts
        .open(ContractData::new(
            unconfigured,
            plan.id(),
            PaymentType::Yearly,
            launch_at,
        ))
        .await?
        .id();

    let plan = app.plans.retire(plan.id(), retire_at).await?;
    let after = retire_at + (retire_at - launch_at) / 2;
    let active_after_retirement = active_ids(app, after).await;

    tracing::info!(
        plan_id = %plan.id(),
        version = %plan.version(),
        status = %plan.status(),
        active_while_launched = active_while_launched.len(),
        active_after_retirement = active_after_retirement.len(),
        "walkthrough finished"
    );

    Ok(WalkthroughReport {
        plan,
        active_while_launched,
        active_after_retirement,
        paying_contract,
        unconfigured_contract,
    })
}

async fn active_ids(app: &App, now: DateTime<Utc>) -> Vec<PlanId> {
    app.plans
        .list_active(now)
        .await
        .iter()
        .map(Plan::id)
        .collect()
}
