//! Integration test harness.

mod mock_exchange;

mod control_flow;
