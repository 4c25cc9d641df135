//! Carrier name to adapter resolution.
//!
//! Names are matched case-insensitively. Each registered name owns a factory that is
//! invoked lazily on the first [`CarrierRegistry::create`]; the resulting adapter is
//! shared by every later lookup of that name, so one credential set maps to exactly one
//! token cache.

// self
use crate::{
	_prelude::*,
	carrier::{CarrierAdapter, ups::UpsProtocol},
	config::RatesConfig,
	error::{ConfigError, RegistryError},
	transport::Transport,
};

/// Factory producing a carrier adapter on first use.
pub type AdapterFactory =
	Box<dyn Fn() -> Result<Arc<dyn CarrierAdapter>, ConfigError> + 'static + Send + Sync>;

/// Registry of carrier factories and the adapters they produced.
#[derive(Default)]
pub struct CarrierRegistry {
	factories: BTreeMap<String, AdapterFactory>,
	adapters: RwLock<BTreeMap<String, Arc<dyn CarrierAdapter>>>,
}
impl CarrierRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds a registry with every carrier enabled in `config`, all sharing `transport`.
	pub fn from_config(config: &RatesConfig, transport: Transport) -> Result<Self, ConfigError> {
		config.validate()?;

		let mut registry = Self::new();

		if let Some(ups) = config.ups.clone() {
			registry.register(UpsProtocol::CARRIER, move || {
				Ok(Arc::new(UpsProtocol::adapter(ups.clone(), transport.clone())))
			});
		}

		Ok(registry)
	}

	/// Registers (or replaces) a factory under `name`.
	pub fn register<F>(&mut self, name: &str, factory: F) -> &mut Self
	where
		F: 'static + Send + Sync + Fn() -> Result<Arc<dyn CarrierAdapter>, ConfigError>,
	{
		let key = normalize(name);

		self.adapters.write().remove(&key);
		self.factories.insert(key, Box::new(factory));

		self
	}

	/// Registers an already-built adapter under its own name.
	pub fn register_adapter(&mut self, adapter: Arc<dyn CarrierAdapter>) -> &mut Self {
		let name = adapter.name().to_owned();

		self.register(&name, move || Ok(adapter.clone()))
	}

	/// Resolves `name` to its adapter, building it on first use.
	pub fn create(&self, name: &str) -> Result<Arc<dyn CarrierAdapter>> {
		let key = normalize(name);

		if let Some(adapter) = self.adapters.read().get(&key).cloned() {
			return Ok(adapter);
		}

		let factory = self.factories.get(&key).ok_or_else(|| RegistryError::UnknownCarrier {
			name: name.trim().to_owned(),
			supported: self.list_supported().into_iter().collect(),
		})?;
		let mut adapters = self.adapters.write();

		if let Some(adapter) = adapters.get(&key) {
			return Ok(adapter.clone());
		}

		let adapter = factory()?;

		adapters.insert(key, adapter.clone());

		Ok(adapter)
	}

	/// Registered carrier names (lower-case, sorted).
	pub fn list_supported(&self) -> BTreeSet<String> {
		self.factories.keys().cloned().collect()
	}

	/// Returns true when `name` resolves to a registered carrier.
	pub fn is_supported(&self, name: &str) -> bool {
		self.factories.contains_key(&normalize(name))
	}
}
impl Debug for CarrierRegistry {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CarrierRegistry")
			.field("supported", &self.list_supported())
			.field("built", &self.adapters.read().keys().collect::<Vec<_>>())
			.finish()
	}
}

pub(crate) fn normalize(name: &str) -> String {
	name.trim().to_ascii_lowercase()
}
