//! Shared test doubles for the orchestrator's unit tests.

use mockall::mock;
use pgboot_config::DatabaseName;
use pgboot_engine::{
    ClusterEngine, EngineError, InitRequest, SqlSession, StartRequest, StopRequest,
};

mock! {
    pub Engine {}
    impl ClusterEngine for Engine {
        fn init_cluster(&self, request: &InitRequest) -> Result<(), EngineError>;
        fn start(&self, request: &StartRequest) -> Result<(), EngineError>;
        fn stop(&self, request: &StopRequest) -> Result<(), EngineError>;
        fn execute_sql(&self, session: &SqlSession, sql: &str) -> Result<(), EngineError>;
        fn database_exists(
            &self,
            session: &SqlSession,
            name: &DatabaseName,
        ) -> Result<bool, EngineError>;
    }
}
