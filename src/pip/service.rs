//! Cascading admin lookup: province, then amphoe, then tambon.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use super::{scan, DatasetKey, DatasetRepository, FsRepository};
use crate::error::{LookupError, Result};
use crate::models::{
    AccuracyConfig, AdminLevel, AdminLookup, AdminUnit, AmphoeLookup, Coordinate, ProvinceLookup,
    ResolvedAccuracy, TambonLookup,
};

/// Point-in-Polygon lookup service over a dataset repository.
///
/// Holds no per-call state; share it behind an `Arc` for concurrent use.
pub struct AdminResolver<R = FsRepository> {
    repository: R,
    deadline: Option<Duration>,
}

impl<R: DatasetRepository> AdminResolver<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            deadline: None,
        }
    }

    /// Abort any lookup that runs longer than `deadline`
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Find the province containing `(lat, lng)`.
    ///
    /// `accuracy = None` reads accuracy level 1.
    pub async fn find_province(
        &self,
        lat: f64,
        lng: f64,
        accuracy: Option<&AccuracyConfig>,
    ) -> Result<ProvinceLookup> {
        self.bounded(async {
            let (point, accuracy) = validate(lat, lng, accuracy, AdminLevel::Province)?;
            self.province_step(&point, &accuracy).await
        })
        .await
    }

    /// Find the province and amphoe containing `(lat, lng)`.
    ///
    /// The amphoe dataset is never read when no province matches.
    pub async fn find_amphoe(
        &self,
        lat: f64,
        lng: f64,
        accuracy: Option<&AccuracyConfig>,
    ) -> Result<AmphoeLookup> {
        self.bounded(async {
            let (point, accuracy) = validate(lat, lng, accuracy, AdminLevel::Amphoe)?;
            self.amphoe_step(&point, &accuracy).await
        })
        .await
    }

    /// Find the province, amphoe and tambon containing `(lat, lng)`.
    ///
    /// Stops at the first level that does not match; deeper levels are `None`.
    pub async fn find_tambon(
        &self,
        lat: f64,
        lng: f64,
        accuracy: Option<&AccuracyConfig>,
    ) -> Result<TambonLookup> {
        self.bounded(async {
            let (point, accuracy) = validate(lat, lng, accuracy, AdminLevel::Tambon)?;
            self.tambon_step(&point, &accuracy).await
        })
        .await
    }

    /// Lookup down to `depth`, for callers choosing the depth at runtime
    pub async fn find(
        &self,
        lat: f64,
        lng: f64,
        depth: AdminLevel,
        accuracy: Option<&AccuracyConfig>,
    ) -> Result<AdminLookup> {
        Ok(match depth {
            AdminLevel::Province => {
                AdminLookup::Province(self.find_province(lat, lng, accuracy).await?)
            }
            AdminLevel::Amphoe => AdminLookup::Amphoe(self.find_amphoe(lat, lng, accuracy).await?),
            AdminLevel::Tambon => AdminLookup::Tambon(self.find_tambon(lat, lng, accuracy).await?),
        })
    }

    async fn province_step(
        &self,
        point: &Coordinate,
        accuracy: &ResolvedAccuracy,
    ) -> Result<ProvinceLookup> {
        let key = DatasetKey::province(accuracy.get(AdminLevel::Province));
        let province = self.scan_level(&key, point).await?;
        Ok(ProvinceLookup { province })
    }

    async fn amphoe_step(
        &self,
        point: &Coordinate,
        accuracy: &ResolvedAccuracy,
    ) -> Result<AmphoeLookup> {
        let ProvinceLookup { province } = self.province_step(point, accuracy).await?;

        let Some(province) = province else {
            debug!("No province at {:?}, skipping amphoe lookup", point);
            return Ok(AmphoeLookup::default());
        };

        let key = DatasetKey::amphoe(accuracy.get(AdminLevel::Amphoe), &province.pcode);
        let amphoe = self.scan_level(&key, point).await?;
        Ok(AmphoeLookup {
            province: Some(province),
            amphoe,
        })
    }

    async fn tambon_step(
        &self,
        point: &Coordinate,
        accuracy: &ResolvedAccuracy,
    ) -> Result<TambonLookup> {
        let AmphoeLookup { province, amphoe } = self.amphoe_step(point, accuracy).await?;

        let Some(amphoe) = amphoe else {
            debug!("No amphoe at {:?}, skipping tambon lookup", point);
            return Ok(TambonLookup {
                province,
                amphoe: None,
                tambon: None,
            });
        };

        let key = DatasetKey::tambon(accuracy.get(AdminLevel::Tambon), &amphoe.pcode);
        let tambon = self.scan_level(&key, point).await?;
        Ok(TambonLookup {
            province,
            amphoe: Some(amphoe),
            tambon,
        })
    }

    async fn scan_level(&self, key: &DatasetKey, point: &Coordinate) -> Result<Option<AdminUnit>> {
        let stream = self.repository.open(key)?;
        scan(stream, key.level(), point).await
    }

    /// Run `lookup` under the configured deadline. Expiry drops the
    /// in-flight stream, which stops its producer.
    async fn bounded<T>(&self, lookup: impl Future<Output = Result<T>>) -> Result<T> {
        match self.deadline {
            Some(deadline) => tokio::time::timeout(deadline, lookup)
                .await
                .map_err(|_| LookupError::Timeout(deadline))?,
            None => lookup.await,
        }
    }
}

/// Check inputs before any dataset is touched
fn validate(
    lat: f64,
    lng: f64,
    accuracy: Option<&AccuracyConfig>,
    depth: AdminLevel,
) -> Result<(Coordinate, ResolvedAccuracy)> {
    let point = Coordinate::new(lat, lng)?;
    let accuracy = match accuracy {
        Some(config) => config.resolve(depth)?,
        None => ResolvedAccuracy::defaults(depth),
    };
    Ok((point, accuracy))
}
