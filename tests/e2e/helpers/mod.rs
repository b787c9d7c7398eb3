use login_cache::LoginCache;
use std::sync::Arc;
use test_context::AsyncTestContext;


use fake_backend::FakeBackend;

/// Cache whose provisioner, session factory and reset all run against `backend`
pub fn new_cache(backend: &Arc<FakeBackend>) -> LoginCache {
    LoginCache::new(backend.clone(), backend.clone(), backend.clone())
}

/// Per-test harness: the setup/teardown hooks a suite wraps around its tests.
///
/// Two logins are registered up front; teardown cleans and deletes every
/// identity the test caused to be created.
pub struct TestContext {
    pub backend: Arc<FakeBackend>,
    pub cache: LoginCache,
}

impl AsyncTestContext for TestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        async {
            let backend = Arc::new(FakeBackend::default());
            let cache = new_cache(&backend);
            cache.register_intended_use(2);

            Self { backend, cache }
        }
    }

    fn teardown(self) -> impl std::future::Future<Output = ()> + Send {
        async move {
            self.cache
                .clean_all()
                .await
                .expect("Failed to clean logins");
            self.cache
                .teardown_all()
                .await
                .expect("Failed to tear down logins");
            assert_eq!(
                self.backend.live_accounts(),
                0,
                "Teardown leaked test identities"
            );
        }
    }
}
