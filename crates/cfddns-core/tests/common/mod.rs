//! Test doubles and common utilities for contract tests
//!
//! Every double is `Clone` and keeps its state behind `Arc`s, so a test can
//! box one copy into the reconciler and keep another to inspect calls.

#![allow(dead_code)]

use cfddns_core::error::{Error, Result};
use cfddns_core::traits::{DnsProvider, DnsRecord, IpSource};
use cfddns_core::Reconciler;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const DOMAIN: &str = "home.example.com";

/// An IpSource returning a settable address, or failing when unset
#[derive(Clone)]
pub struct FixedIpSource {
    ip: Arc<Mutex<Option<Ipv4Addr>>>,
    current_call_count: Arc<AtomicUsize>,
}

impl FixedIpSource {
    pub fn new(ip: Ipv4Addr) -> Self {
        Self {
            ip: Arc::new(Mutex::new(Some(ip))),
            current_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A source whose every call fails with a resolution error
    pub fn failing() -> Self {
        Self {
            ip: Arc::new(Mutex::new(None)),
            current_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn set_ip(&self, ip: Option<Ipv4Addr>) {
        *self.ip.lock().unwrap() = ip;
    }

    /// Get the number of times current() was called
    pub fn current_call_count(&self) -> usize {
        self.current_call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpSource for FixedIpSource {
    async fn current(&self) -> Result<Ipv4Addr> {
        self.current_call_count.fetch_add(1, Ordering::SeqCst);
        let ip = *self.ip.lock().unwrap();
        ip.ok_or_else(|| Error::resolution("IP echo service unreachable"))
    }

    fn source_name(&self) -> &'static str {
        "fixed"
    }
}

/// An IpSource that panics, to exercise the scheduler's error boundary
#[derive(Clone, Default)]
pub struct PanickingIpSource {
    current_call_count: Arc<AtomicUsize>,
}

impl PanickingIpSource {
    pub fn current_call_count(&self) -> usize {
        self.current_call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpSource for PanickingIpSource {
    async fn current(&self) -> Result<Ipv4Addr> {
        self.current_call_count.fetch_add(1, Ordering::SeqCst);
        panic!("ip source exploded");
    }

    fn source_name(&self) -> &'static str {
        "panicking"
    }
}

/// An in-memory zone that tracks calls
///
/// create/update mutate the shared record list, so consecutive cycles see
/// the effect of earlier ones just like a real provider.
#[derive(Clone, Default)]
pub struct MockDnsProvider {
    records: Arc<Mutex<Vec<DnsRecord>>>,
    list_call_count: Arc<AtomicUsize>,
    create_call_count: Arc<AtomicUsize>,
    update_call_count: Arc<AtomicUsize>,
    /// (domain_name, ip) per create call
    created: Arc<Mutex<Vec<(String, Ipv4Addr)>>>,
    /// (record_id, domain_name, ip) per update call
    updated: Arc<Mutex<Vec<(String, String, Ipv4Addr)>>>,
    fail_list: Arc<AtomicBool>,
    fail_mutations: Arc<AtomicBool>,
}

impl MockDnsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<DnsRecord>) -> Self {
        let provider = Self::default();
        *provider.records.lock().unwrap() = records;
        provider
    }

    pub fn set_fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    /// Make create and update fail as if the API answered success=false
    pub fn set_fail_mutations(&self, fail: bool) {
        self.fail_mutations.store(fail, Ordering::SeqCst);
    }

    /// Overwrite a record's content out of band
    pub fn edit_content(&self, record_id: &str, content: &str) {
        let mut records = self.records.lock().unwrap();
        if let Some(record) = records.iter_mut().find(|r| r.id == record_id) {
            record.content = content.to_string();
        }
    }

    pub fn records(&self) -> Vec<DnsRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn list_call_count(&self) -> usize {
        self.list_call_count.load(Ordering::SeqCst)
    }

    pub fn create_call_count(&self) -> usize {
        self.create_call_count.load(Ordering::SeqCst)
    }

    pub fn update_call_count(&self) -> usize {
        self.update_call_count.load(Ordering::SeqCst)
    }

    pub fn mutation_count(&self) -> usize {
        self.create_call_count() + self.update_call_count()
    }

    pub fn created(&self) -> Vec<(String, Ipv4Addr)> {
        self.created.lock().unwrap().clone()
    }

    pub fn updated(&self) -> Vec<(String, String, Ipv4Addr)> {
        self.updated.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn list_records(&self) -> Result<Vec<DnsRecord>> {
        self.list_call_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(Error::list("HTTP request failed: connection refused"));
        }
        Ok(self.records())
    }

    async fn create_record(&self, domain_name: &str, ip: Ipv4Addr) -> Result<DnsRecord> {
        let n = self.create_call_count.fetch_add(1, Ordering::SeqCst);
        self.created.lock().unwrap().push((domain_name.to_string(), ip));

        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(Error::create("[81057] Record already exists."));
        }

        let record = DnsRecord::a(format!("created-{}", n + 1), domain_name, ip);
        self.records.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn update_record(&self, record_id: &str, domain_name: &str, ip: Ipv4Addr) -> Result<DnsRecord> {
        self.update_call_count.fetch_add(1, Ordering::SeqCst);
        self.updated
            .lock()
            .unwrap()
            .push((record_id.to_string(), domain_name.to_string(), ip));

        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(Error::update("[9000] Invalid record content"));
        }

        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.id == record_id)
            .ok_or_else(|| Error::update("Not found (check zone/record ID). Status: 404 Not Found"))?;
        *record = DnsRecord::a(record_id, domain_name, ip);
        Ok(record.clone())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Build a record of any type
pub fn record(id: &str, record_type: &str, name: &str, content: &str) -> DnsRecord {
    DnsRecord {
        id: id.to_string(),
        record_type: record_type.to_string(),
        name: name.to_string(),
        content: content.to_string(),
        proxied: false,
        ttl: Some(1),
        comment: None,
    }
}

/// Build a reconciler for [`DOMAIN`] from test doubles
pub fn reconciler(ip_source: &FixedIpSource, provider: &MockDnsProvider) -> Reconciler {
    Reconciler::new(Box::new(ip_source.clone()), Box::new(provider.clone()), DOMAIN)
}
