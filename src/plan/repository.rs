//! Trip plan storage
//!
//! Plans are stored as JSON files, one per plan, in a single directory.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use time::macros::format_description;

use super::trip_plan::TripPlan;
use crate::{Result, TouringError};

pub const FILE_EXT: &str = ".plan";

pub struct TripRepository {
    dir: PathBuf,
}

impl TripRepository {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name of the plan: sanitized name, start time if any, extension
    pub fn file_name(plan: &TripPlan) -> Result<String> {
        let name: String = plan
            .name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();

        let start = match plan.time_start {
            Some(start) => start
                .format(format_description!(
                    "[year]_[month]_[day]_[hour]_[minute]"
                ))
                .map_err(|e| TouringError::InvalidRecord(e.to_string()))?,
            None => String::new(),
        };

        Ok(format!("{}{}{}", name, start, FILE_EXT))
    }

    /// Store the plan, returning the file name it was saved with
    pub fn save(&self, plan: &TripPlan) -> Result<String> {
        let file_name = Self::file_name(plan)?;
        let json = serde_json::to_string(plan)?;

        fs::create_dir_all(&self.dir)?;
        fs::write(self.dir.join(&file_name), json)?;
        info!("Trip plan saved to file: {}", file_name);

        Ok(file_name)
    }

    pub fn load(&self, file_name: &str) -> Result<TripPlan> {
        let json = match fs::read_to_string(self.dir.join(file_name)) {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(TouringError::PlanNotFound(file_name.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        let plan = serde_json::from_str(&json)?;
        debug!("Trip plan loaded from file: {}", file_name);

        Ok(plan)
    }

    /// All the readable plans of the storage, sorted by file name
    pub fn list(&self) -> Result<Vec<(String, TripPlan)>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Dir {} doesn't exist", self.dir.display());
                return Ok(vec![]);
            }
            Err(e) => return Err(e.into()),
        };

        let mut names = vec![];
        for entry in entries {
            let entry = entry?;
            if let Some(name) = entry.file_name().to_str() {
                if name.ends_with(FILE_EXT) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();

        let mut plans = vec![];
        for name in names {
            match self.load(&name) {
                Ok(plan) => plans.push((name, plan)),
                Err(e) => warn!("Skipping trip plan {}: {}", name, e),
            }
        }

        Ok(plans)
    }

    pub fn delete(&self, file_name: &str) -> Result<()> {
        match fs::remove_file(self.dir.join(file_name)) {
            Ok(()) => {
                info!("Trip plan deleted: {}", file_name);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(TouringError::PlanNotFound(file_name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Point;
    use tempfile::TempDir;
    use time::macros::datetime;

    #[test]
    fn plan_file_name() -> Result<()> {
        let mut plan = TripPlan::new("Lake Pepin, day 1!".to_string(), Point::new(-92.3, 44.5));
        assert_eq!("Lake_Pepin__day_1_.plan", TripRepository::file_name(&plan)?);

        plan.time_start = Some(datetime!(2023-05-01 09:07 UTC));
        assert_eq!(
            "Lake_Pepin__day_1_2023_05_01_09_07.plan",
            TripRepository::file_name(&plan)?
        );

        Ok(())
    }

    #[test]
    fn save_load_delete() -> Result<()> {
        let tmp = TempDir::new()?;
        let repo = TripRepository::new(tmp.path().join("plans"));

        let mut plan = TripPlan::new("river".to_string(), Point::new(-93.2, 44.9));
        plan.push_waypoint("end".to_string(), vec![Point::new(-93.1, 44.95)], 9_000.0);

        let name = repo.save(&plan)?;
        assert_eq!("river.plan", name);
        assert_eq!(plan, repo.load(&name)?);

        repo.delete(&name)?;
        assert!(matches!(repo.load(&name), Err(TouringError::PlanNotFound(_))));
        assert!(matches!(repo.delete(&name), Err(TouringError::PlanNotFound(_))));

        Ok(())
    }

    #[test]
    fn list_skips_broken_plans() -> Result<()> {
        let tmp = TempDir::new()?;
        let repo = TripRepository::new(tmp.path());
        assert!(repo.list()?.is_empty());

        repo.save(&TripPlan::new("b".to_string(), Point::new(0.0, 0.0)))?;
        repo.save(&TripPlan::new("a".to_string(), Point::new(1.0, 1.0)))?;
        fs::write(tmp.path().join("broken.plan"), "{not json")?;
        fs::write(tmp.path().join("notes.txt"), "ignored")?;

        let plans = repo.list()?;
        let names: Vec<&str> = plans.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(vec!["a.plan", "b.plan"], names);

        assert!(matches!(repo.load("broken.plan"), Err(TouringError::PlanFormat(_))));

        Ok(())
    }

    #[test]
    fn list_missing_dir() -> Result<()> {
        let tmp = TempDir::new()?;
        let repo = TripRepository::new(tmp.path().join("nope"));
        assert!(repo.list()?.is_empty());

        Ok(())
    }
}
