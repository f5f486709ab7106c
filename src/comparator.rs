use crate::{
    compare::RoleComparison,
    config::Settings,
    error::Error,
    explorer::{ExplorerClient, Side},
    persist, report,
    role::ContractRole,
};
use ethers::types::Address;
use std::{
    collections::BTreeMap,
    io::{self, Write},
    path::PathBuf,
};

/// What happened to one role during a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoleOutcome {
    Equal,
    /// `mismatches` files differ. `written` is false when the dump could not be created.
    Different { mismatches: usize, written: bool },
    Failed { kind: &'static str },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub outcomes: Vec<(ContractRole, RoleOutcome)>,
}

impl RunSummary {
    pub fn count(&self, f: impl Fn(&RoleOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, outcome)| f(outcome)).count()
    }

    pub fn equal(&self) -> usize {
        self.count(|outcome| matches!(outcome, RoleOutcome::Equal))
    }

    /// Roles whose sources differ and were dumped for inspection.
    pub fn different(&self) -> usize {
        self.count(|outcome| matches!(outcome, RoleOutcome::Different { written: true, .. }))
    }

    /// Roles that could not be compared, or whose differing sources could not be dumped.
    pub fn failed(&self) -> usize {
        self.count(|outcome| {
            matches!(outcome, RoleOutcome::Failed { .. } | RoleOutcome::Different { written: false, .. })
        })
    }

    /// Process exit status: 0 when everything matched, 1 when sources differ, 2 on any failure.
    pub fn exit_code(&self) -> u8 {
        if self.failed() > 0 {
            2
        } else if self.different() > 0 {
            1
        } else {
            0
        }
    }
}

/// Compares the verified sources of every role between the origin and fork explorers.
pub struct Comparator {
    origin: ExplorerClient,
    fork: ExplorerClient,
    origin_addresses: BTreeMap<ContractRole, Address>,
    fork_addresses: BTreeMap<ContractRole, Address>,
    output_dir: PathBuf,
}

impl Comparator {
    pub fn new(
        origin: ExplorerClient,
        fork: ExplorerClient,
        origin_addresses: BTreeMap<ContractRole, Address>,
        fork_addresses: BTreeMap<ContractRole, Address>,
        output_dir: PathBuf,
    ) -> Self {
        Self { origin, fork, origin_addresses, fork_addresses, output_dir }
    }

    /// Builds the explorer clients described by `settings`.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let timeout = settings.application.request_timeout();
        let client = |side: Side| -> anyhow::Result<ExplorerClient> {
            let explorer = settings.explorer(side);
            let client = ExplorerClient::new(
                explorer.name.clone(),
                explorer.api_url()?,
                explorer.api_key(),
                timeout,
            )?;
            Ok(client)
        };
        Ok(Self::new(
            client(Side::Origin)?,
            client(Side::Fork)?,
            settings.origin.addresses.clone(),
            settings.fork.addresses.clone(),
            settings.application.output_dir.clone(),
        ))
    }

    /// Fetches both sides' sources for `role` and compares them. Nothing is printed or written.
    #[tracing::instrument(
        name = "Comparing role",
        skip(self),
        fields(origin = %self.origin.name(), fork = %self.fork.name())
    )]
    pub async fn compare_role(
        &self,
        role: ContractRole,
        origin_address: Address,
        fork_address: Address,
    ) -> Result<RoleComparison, Error> {
        let (origin, fork) = futures::try_join!(
            async {
                self.origin
                    .get_source_code(origin_address)
                    .await
                    .map_err(|source| Error::Explorer { side: Side::Origin, source })
            },
            async {
                self.fork
                    .get_source_code(fork_address)
                    .await
                    .map_err(|source| Error::Explorer { side: Side::Fork, source })
            },
        )?;

        let comparison = RoleComparison::new(role, origin, fork);
        let fork_only = comparison.fork_only_paths();
        if !fork_only.is_empty() {
            tracing::debug!(?fork_only, "Fork has files the origin does not");
        }
        tracing::info!(
            files = comparison.files.len(),
            mismatches = comparison.mismatches(),
            "Compared sources"
        );
        Ok(comparison)
    }

    /// Compares `roles` one after another, printing the report to `out`. A failing role is
    /// reported and the run moves on to the next one.
    pub async fn run(
        &self,
        roles: &[ContractRole],
        out: &mut impl Write,
    ) -> io::Result<RunSummary> {
        let mut summary = RunSummary::default();
        for &role in roles {
            report::header(out, role)?;
            let outcome = match self.addresses(role) {
                Some((origin, fork)) => match self.compare_role(role, origin, fork).await {
                    Ok(comparison) => self.handle_comparison(out, &comparison)?,
                    Err(err) => fail(out, role, &err)?,
                },
                None => {
                    tracing::error!(%role, "No address configured");
                    writeln!(out, "{role} skipped: no address configured")?;
                    RoleOutcome::Failed { kind: "ConfigError" }
                }
            };
            report::separator(out)?;
            summary.outcomes.push((role, outcome));
        }
        writeln!(
            out,
            "{} equal, {} different, {} failed",
            summary.equal(),
            summary.different(),
            summary.failed()
        )?;
        Ok(summary)
    }

    fn addresses(&self, role: ContractRole) -> Option<(Address, Address)> {
        Some((*self.origin_addresses.get(&role)?, *self.fork_addresses.get(&role)?))
    }

    fn handle_comparison(
        &self,
        out: &mut impl Write,
        comparison: &RoleComparison,
    ) -> io::Result<RoleOutcome> {
        report::comparison(out, comparison)?;
        if comparison.is_equal() {
            return Ok(RoleOutcome::Equal)
        }

        let mismatches = comparison.mismatches();
        match persist::write_sources(
            &self.output_dir,
            comparison.role,
            &comparison.origin,
            &comparison.fork,
        ) {
            Ok(paths) => {
                report::written(out, &paths)?;
                Ok(RoleOutcome::Different { mismatches, written: true })
            }
            Err(err) => {
                fail(out, comparison.role, &err)?;
                Ok(RoleOutcome::Different { mismatches, written: false })
            }
        }
    }
}

fn fail(out: &mut impl Write, role: ContractRole, err: &Error) -> io::Result<RoleOutcome> {
    tracing::error!(%role, kind = err.kind(), error = %err, "Role failed");
    report::failure(out, role, err)?;
    Ok(RoleOutcome::Failed { kind: err.kind() })
}
