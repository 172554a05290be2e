//! Test doubles and common utilities for the contract tests
//!
//! `MockConsoleApi` is a scripted stand-in for the REST surface: tests queue
//! per-endpoint responses up front and assert on call counters afterwards.
//! Endpoints can additionally be gated so a test controls exactly when an
//! in-flight call resolves, which is how the stale-response and
//! last-response-wins contracts are exercised.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::oneshot;

use console_core::error::{Error, Result};
use console_core::traits::api::{ConsoleApi, Domain, RecordField, ServiceInfo, User};

/// Build a domain record for tests
pub fn domain(name: &str, ipv4: Option<&str>, ipv6: Option<&str>) -> Domain {
    Domain {
        name: name.to_string(),
        ipv4: ipv4.map(str::to_string),
        ipv6: ipv6.map(str::to_string),
    }
}

/// Build a user record for tests
pub fn user(username: &str) -> User {
    User {
        username: username.to_string(),
        created: "2024-01-01".to_string(),
    }
}

#[derive(Default)]
struct Script {
    login: VecDeque<Result<String>>,
    create_account: VecDeque<Result<String>>,
    fetch_user: VecDeque<Result<User>>,
    list_domains: VecDeque<Result<Vec<Domain>>>,
    update_record: VecDeque<Result<()>>,
    delete_domain: VecDeque<Result<()>>,
    logout: VecDeque<Result<()>>,
}

/// A scripted ConsoleApi that tracks calls
#[derive(Default)]
pub struct MockConsoleApi {
    script: Mutex<Script>,
    gates: Mutex<HashMap<&'static str, VecDeque<oneshot::Receiver<()>>>>,

    pub login_calls: AtomicUsize,
    pub user_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    pub logout_calls: AtomicUsize,

    /// Record of (name, field, value) triples passed to update_record
    pub updates_seen: Mutex<Vec<(String, RecordField, String)>>,
}

impl MockConsoleApi {
    pub fn new() -> Self {
        Self::default()
    }

    // -- scripting ---------------------------------------------------------

    pub fn login_ok(&self, token: &str) -> &Self {
        self.script
            .lock()
            .unwrap()
            .login
            .push_back(Ok(token.to_string()));
        self
    }

    pub fn login_rejected(&self) -> &Self {
        self.script
            .lock()
            .unwrap()
            .login
            .push_back(Err(Error::InvalidCredentials));
        self
    }

    pub fn create_account_ok(&self, token: &str) -> &Self {
        self.script
            .lock()
            .unwrap()
            .create_account
            .push_back(Ok(token.to_string()));
        self
    }

    pub fn create_account_rejected(&self) -> &Self {
        self.script
            .lock()
            .unwrap()
            .create_account
            .push_back(Err(Error::UserExists));
        self
    }

    pub fn user_ok(&self, u: User) -> &Self {
        self.script.lock().unwrap().fetch_user.push_back(Ok(u));
        self
    }

    pub fn user_err(&self, e: Error) -> &Self {
        self.script.lock().unwrap().fetch_user.push_back(Err(e));
        self
    }

    pub fn domains_ok(&self, domains: Vec<Domain>) -> &Self {
        self.script
            .lock()
            .unwrap()
            .list_domains
            .push_back(Ok(domains));
        self
    }

    pub fn domains_err(&self, e: Error) -> &Self {
        self.script.lock().unwrap().list_domains.push_back(Err(e));
        self
    }

    pub fn update_ok(&self) -> &Self {
        self.script.lock().unwrap().update_record.push_back(Ok(()));
        self
    }

    pub fn update_err(&self, e: Error) -> &Self {
        self.script.lock().unwrap().update_record.push_back(Err(e));
        self
    }

    pub fn delete_ok(&self) -> &Self {
        self.script.lock().unwrap().delete_domain.push_back(Ok(()));
        self
    }

    pub fn delete_err(&self, e: Error) -> &Self {
        self.script.lock().unwrap().delete_domain.push_back(Err(e));
        self
    }

    pub fn logout_err(&self) -> &Self {
        self.script
            .lock()
            .unwrap()
            .logout
            .push_back(Err(Error::transport("connection refused")));
        self
    }

    // -- gating ------------------------------------------------------------

    /// Hold the next call to the named endpoint until the returned sender
    /// fires (or is dropped). Calls take gates in FIFO order.
    pub fn hold(&self, op: &'static str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates
            .lock()
            .unwrap()
            .entry(op)
            .or_default()
            .push_back(rx);
        tx
    }

    async fn wait_gate(&self, op: &'static str) {
        let gate = self
            .gates
            .lock()
            .unwrap()
            .get_mut(op)
            .and_then(VecDeque::pop_front);
        if let Some(rx) = gate {
            // A dropped sender releases the gate too
            let _ = rx.await;
        }
    }

    fn take<T>(queue: &mut VecDeque<Result<T>>, op: &str) -> Result<T> {
        queue
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted response for {}", op))
    }
}

#[async_trait::async_trait]
impl ConsoleApi for MockConsoleApi {
    async fn login(&self, _username: &str, _password: &str) -> Result<String> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        Self::take(&mut self.script.lock().unwrap().login, "login")
    }

    async fn create_account(&self, _username: &str, _password: &str) -> Result<String> {
        Self::take(
            &mut self.script.lock().unwrap().create_account,
            "create_account",
        )
    }

    async fn fetch_user(&self, _token: &str) -> Result<User> {
        self.user_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_gate("fetch_user").await;
        Self::take(&mut self.script.lock().unwrap().fetch_user, "fetch_user")
    }

    async fn logout(&self, _token: &str) -> Result<()> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap()
            .logout
            .pop_front()
            .unwrap_or(Ok(()))
    }

    async fn list_domains(&self, _token: &str) -> Result<Vec<Domain>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_gate("list_domains").await;
        Self::take(&mut self.script.lock().unwrap().list_domains, "list_domains")
    }

    async fn update_record(
        &self,
        _token: &str,
        name: &str,
        field: RecordField,
        value: &str,
    ) -> Result<()> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_gate("update_record").await;
        self.updates_seen
            .lock()
            .unwrap()
            .push((name.to_string(), field, value.to_string()));
        Self::take(
            &mut self.script.lock().unwrap().update_record,
            "update_record",
        )
    }

    async fn delete_domain(&self, _token: &str, _name: &str) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        Self::take(
            &mut self.script.lock().unwrap().delete_domain,
            "delete_domain",
        )
    }

    async fn service_info(&self) -> Result<ServiceInfo> {
        Ok(ServiceInfo {
            dns_zone: "dyn.example.org.".to_string(),
        })
    }
}
