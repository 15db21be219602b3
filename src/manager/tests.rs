//! Manager Module Tests
//!
//! Validates cluster orchestration and the aggregated outcome.
//!
//! ## Test Scopes
//! - **Config**: defaults and validation of run parameters.
//! - **Roster**: termination bookkeeping, aggregate asymmetry and duplicate rejection.
//! - **Report**: summary arithmetic and console formatting.
//! - **Cluster Runs**: end-to-end runs of the concurrent manager, including timeout cancellation.

#[cfg(test)]
mod tests {
    use crate::manager::config::SimulationConfig;
    use crate::manager::report::SimulationReport;
    use crate::manager::roster::ActiveRoster;
    use crate::manager::service::GossipManager;
    use crate::member::types::{MemberReport, PeerId, TerminalState};
    use std::time::Duration;

    fn report(peer: u32, state: TerminalState, view_size: u32, gossips: u64) -> MemberReport {
        MemberReport {
            peer_id: PeerId(peer),
            state,
            view: (1..=view_size).rev().map(PeerId).collect(),
            gossip_count: gossips,
            round: 1,
            cancelled: false,
        }
    }

    fn scenario(interval_ms: u64, max_iterations: u32, cluster_size: usize) -> SimulationConfig {
        SimulationConfig::new(
            Duration::from_millis(interval_ms),
            max_iterations,
            cluster_size,
        )
    }

    // ============================================================
    // CONFIG TESTS
    // ============================================================

    #[test]
    fn test_default_config_values() {
        let config = SimulationConfig::default();

        assert_eq!(config.interval, Duration::from_millis(250));
        assert_eq!(config.max_iterations, 20);
        assert_eq!(config.cluster_size, 200);
        assert_eq!(config.seed_count, 3);
        assert_eq!(config.rng_seed_multiplier, 31);
        assert!(config.convergence_timeout.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_rejects_invalid_parameters() {
        assert!(scenario(5, 20, 0).validate().is_err());
        assert!(scenario(5, 0, 10).validate().is_err());
        assert!(scenario(5, 20, 2).validate().is_err(), "three seeds need three members");

        let mut no_seeds = scenario(5, 20, 10);
        no_seeds.seed_count = 0;
        assert!(no_seeds.validate().is_err());
    }

    #[test]
    fn test_config_peer_ids_are_contiguous() {
        let config = scenario(5, 20, 7);

        let peers: Vec<PeerId> = config.peer_ids().collect();

        assert_eq!(peers, (1..=7).map(PeerId).collect::<Vec<_>>());
        assert_eq!(config.seed_ids(), vec![PeerId(1), PeerId(2), PeerId(3)]);
    }

    // ============================================================
    // ACTIVE ROSTER TESTS
    // ============================================================

    #[test]
    fn test_roster_shrinks_by_one_per_report() {
        let mut roster = ActiveRoster::new((1..=3).map(PeerId));
        let mut previous = roster.len();

        for peer in 1..=3 {
            roster
                .record(report(peer, TerminalState::Converged, 3, 1))
                .unwrap();
            assert_eq!(roster.len(), previous - 1);
            previous = roster.len();
        }

        assert!(roster.is_empty());
    }

    #[test]
    fn test_roster_aggregates_only_converged_members() {
        let mut roster = ActiveRoster::new((1..=3).map(PeerId));

        roster.record(report(1, TerminalState::Converged, 3, 4)).unwrap();
        roster.record(report(2, TerminalState::FailedExhausted, 2, 9)).unwrap();
        roster.record(report(3, TerminalState::Converged, 3, 2)).unwrap();

        assert_eq!(roster.aggregate_gossip_count(), 6);
        assert!(roster.any_failed());
    }

    #[test]
    fn test_roster_failure_flag_is_sticky() {
        let mut roster = ActiveRoster::new((1..=2).map(PeerId));

        roster.record(report(1, TerminalState::FailedExhausted, 1, 0)).unwrap();
        roster.record(report(2, TerminalState::Converged, 2, 1)).unwrap();

        assert!(roster.any_failed());
    }

    #[test]
    fn test_roster_rejects_duplicate_and_running_reports() {
        let mut roster = ActiveRoster::new((1..=2).map(PeerId));

        roster.record(report(1, TerminalState::Converged, 2, 3)).unwrap();
        assert!(roster.record(report(1, TerminalState::Converged, 2, 3)).is_err());
        assert!(roster.record(report(7, TerminalState::Converged, 2, 3)).is_err());
        assert!(roster.record(report(2, TerminalState::Running, 2, 3)).is_err());

        assert_eq!(roster.len(), 1, "rejected reports leave the roster untouched");
        assert!(roster.contains(PeerId(2)));
        assert_eq!(roster.aggregate_gossip_count(), 3);
    }

    #[test]
    fn test_roster_sorts_final_view() {
        let mut roster = ActiveRoster::new([PeerId(1)]);

        roster.record(report(1, TerminalState::Converged, 4, 0)).unwrap();

        assert_eq!(
            roster.records()[0].view,
            vec![PeerId(1), PeerId(2), PeerId(3), PeerId(4)]
        );
    }

    // ============================================================
    // REPORT TESTS
    // ============================================================

    #[test]
    fn test_report_without_failures_includes_convergence_time() {
        let records = vec![
            report(1, TerminalState::Converged, 2, 3),
            report(2, TerminalState::Converged, 2, 1),
        ];

        let summary = SimulationReport::new(2, records, 4, false, Duration::from_millis(1500));
        let text = summary.to_string();

        assert_eq!(summary.convergence_secs, Some(1.5));
        assert_eq!(summary.average_gossips, 2.0);
        assert!(text.contains("Peer 1 member list size: 2, gossips: 3"));
        assert!(text.contains("Time to convergence: 1.500"));
        assert!(text.ends_with("Total Gossips 4, Avg gossips per member: 2.000"));
    }

    #[test]
    fn test_report_with_failure_omits_convergence_time() {
        let records = vec![
            report(1, TerminalState::Converged, 2, 3),
            report(2, TerminalState::FailedExhausted, 1, 0),
        ];

        let summary = SimulationReport::new(2, records, 3, true, Duration::from_secs(1));
        let text = summary.to_string();

        assert!(summary.convergence_secs.is_none());
        assert!(!text.contains("Time to convergence"));
        assert!(text.contains("FAILED Peer 2 member list size: 1, gossips: 0"));
        assert!(text.contains("Total Gossips 3, Avg gossips per member: 1.500"));
        assert_eq!(summary.failed().count(), 1);
        assert_eq!(summary.converged().count(), 1);
    }

    #[test]
    fn test_report_serializes_to_json() {
        let records = vec![report(1, TerminalState::Converged, 1, 0)];
        let summary = SimulationReport::new(1, records, 0, false, Duration::from_millis(10));

        let json = serde_json::to_value(&summary).expect("Serialization failed");

        assert_eq!(json["cluster_size"], 1);
        assert_eq!(json["records"][0]["state"], "Converged");
        assert_eq!(json["any_failed"], false);
    }

    // ============================================================
    // CLUSTER RUN TESTS
    // ============================================================

    #[tokio::test(start_paused = true)]
    async fn test_small_cluster_converges() {
        // ARRANGE: 5 members, 3 seeds, 20 rounds of 5ms
        let config = scenario(5, 20, 5);

        // ACT
        let manager = GossipManager::new(config).unwrap();
        assert_eq!(manager.active_members(), 5);
        let summary = manager.run().await.unwrap();

        // ASSERT: everyone converged with the full roster
        assert!(!summary.any_failed);
        assert!(summary.convergence_secs.is_some());
        assert_eq!(summary.converged().count(), 5);

        let mut peers: Vec<PeerId> = summary.records.iter().map(|r| r.peer_id).collect();
        peers.sort();
        assert_eq!(peers, (1..=5).map(PeerId).collect::<Vec<_>>());

        for record in &summary.records {
            assert_eq!(record.view, (1..=5).map(PeerId).collect::<Vec<_>>());
        }

        let expected_total: u64 = summary.records.iter().map(|r| r.gossip_count).sum();
        assert_eq!(summary.total_gossips, expected_total);
        assert!(summary.to_string().contains("Time to convergence"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_round_cannot_converge_large_cluster() {
        // ARRANGE: 50 members but only one round each
        let config = scenario(5, 1, 50);

        // ACT
        let summary = GossipManager::new(config).unwrap().run().await.unwrap();

        // ASSERT
        assert!(summary.any_failed);
        assert!(summary.convergence_secs.is_none());
        assert!(summary.failed().count() >= 2);
        assert_eq!(summary.records.len(), 50);
        assert!(!summary.to_string().contains("Time to convergence"));
        for failed in summary.failed() {
            assert!(failed.view_size() < 50);
            assert!(!failed.cancelled);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_member_bootstrapped_with_full_view_converges_first_round() {
        // ARRANGE: 3 seeds + 1 regular member, which already knows all 4 peers
        let config = scenario(5, 20, 4);

        // ACT
        let summary = GossipManager::new(config).unwrap().run().await.unwrap();

        // ASSERT
        let fourth = summary.record(PeerId(4)).expect("member 4 reported");
        assert_eq!(fourth.state, TerminalState::Converged);
        assert_eq!(fourth.round, 1);
        assert_eq!(fourth.view_size(), 4);
        assert!(!summary.any_failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_cancels_unfinished_members() {
        // ARRANGE: rounds far longer than the timeout
        let mut config = scenario(60_000, 100, 8);
        config.convergence_timeout = Some(Duration::from_secs(1));

        // ACT
        let summary = GossipManager::new(config).unwrap().run().await.unwrap();

        // ASSERT: every member still reported exactly once
        assert_eq!(summary.records.len(), 8);
        assert!(summary.any_failed);
        assert!(summary.records.iter().all(|r| r.cancelled && r.round == 0));
        assert_eq!(summary.total_gossips, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_external_cancel_ends_run() {
        let manager = GossipManager::new(scenario(60_000, 100, 6)).unwrap();
        let cancel = manager.cancel_handle();

        assert!(cancel.cancel());
        assert!(!cancel.cancel(), "second cancel is a no-op");

        let summary = manager.run().await.unwrap();
        assert_eq!(summary.failed().count(), 6);
    }

    #[tokio::test]
    async fn test_manager_rejects_invalid_config() {
        assert!(GossipManager::new(scenario(5, 20, 2)).is_err());
    }
}
