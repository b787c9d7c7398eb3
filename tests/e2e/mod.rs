// End-to-end tests for the login cache
//
// The cache is driven through the same hooks a suite uses: register logins
// up front, acquire inside tests, clean between tests and tear down at the
// end. Identity provider, session factory and reset run against an
// in-memory fake backend; the GraphQL and Cognito adapters run against
// wiremock servers.

mod helpers;
mod test_cognito;
