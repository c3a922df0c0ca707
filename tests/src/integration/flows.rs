//! # Integration Test Flows
//!
//! ## Flows Tested:
//!
//! 1. **Enrolment**: device registration, then a profile co-signed by the
//!    device, then results signed by the profile
//! 2. **Late binding**: a profile created alone and bound to a device later,
//!    exactly once
//! 3. **Concurrent binding**: several devices racing for one profile
//! 4. **Reads**: owner, stranger and anonymous callers see different views

#[cfg(test)]
mod tests {
    use crate::fixtures::{der_envelope, envelope, init_tracing, KeyHolder, SignatureForm};
    use chrono::{Duration, TimeZone, Utc};
    use rv_01_signature_verification::{ConflictKind, DefectKind, RequestError};
    use rv_03_resource_api::domain::config::ENV_TIMESTAMP_FORMAT;
    use rv_03_resource_api::{
        ApiConfig, ApiError, ApiRequest, Collection, EntityStore, FixedClock,
        InMemoryEntityStore, ResourceApi, ResourceService,
    };
    use serde_json::{json, Value};
    use shared_types::{EntityKind, Exp, User};
    use std::sync::Arc;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    type Service = ResourceService<InMemoryEntityStore, FixedClock>;

    struct Lab {
        service: Service,
        owner: User,
        exp: Exp,
    }

    fn lab_with(config: ApiConfig) -> Lab {
        init_tracing();
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap());
        let service =
            ResourceService::with_clock(Arc::new(InMemoryEntityStore::new()), clock, config)
                .unwrap();
        let owner = service.create_user("Sam", "sam@uni.edu").unwrap();
        let exp = service
            .create_exp(&owner.id, "commute", "daily commute diary")
            .unwrap();
        Lab {
            service,
            owner,
            exp,
        }
    }

    fn lab() -> Lab {
        lab_with(ApiConfig::default())
    }

    fn request(body: Vec<u8>) -> ApiRequest {
        ApiRequest::new(body)
    }

    fn rejection(result: Result<Value, ApiError>) -> RequestError {
        match result {
            Err(ApiError::Rejected(e)) => e,
            other => panic!("expected a rejection, got {other:?}"),
        }
    }

    fn register(lab: &Lab, device: &KeyHolder) {
        let payload = json!({"device": {"vk_pem": device.pem}});
        lab.service
            .register_device(&request(der_envelope(&payload, &[device])))
            .unwrap();
    }

    fn submit(lab: &Lab, profile: &KeyHolder, data: Value) -> Result<Value, ApiError> {
        let payload = json!({"result": {"profile_id": profile.id(), "result_data": data}});
        lab.service
            .create_result(&request(der_envelope(&payload, &[profile])))
    }

    // =============================================================================
    // ENROLMENT
    // =============================================================================

    #[test]
    fn test_enrolment_with_fixed_width_signatures() {
        let lab = lab();
        let device = KeyHolder::generate();
        let profile = KeyHolder::generate();

        let payload = json!({"device": {"vk_pem": device.pem}});
        lab.service
            .register_device(&request(envelope(&payload, &[&device], SignatureForm::Fixed)))
            .unwrap();

        let payload = json!({"profile": {
            "vk_pem": profile.pem,
            "exp_id": lab.exp.id,
            "device_id": device.id(),
            "profile_data": {"mode": "bike"}
        }});
        let created = lab
            .service
            .create_profile(&request(envelope(
                &payload,
                &[&device, &profile],
                SignatureForm::Fixed,
            )))
            .unwrap();
        assert_eq!(created["device_id"], json!(device.id()));
        assert_eq!(created["exp"]["name"], json!("commute"));

        for minutes in [25, 31, 18] {
            submit(&lab, &profile, json!({"minutes": minutes})).unwrap();
            lab.service.clock().advance(Duration::hours(24));
        }

        let owner = ApiRequest::empty().with_caller(&lab.owner.id);
        let read = lab
            .service
            .get(EntityKind::Profile, &profile.id(), &owner)
            .unwrap();
        assert_eq!(read["n_results"], json!(3));
        assert_eq!(read["exp"]["n_results"], json!(3));

        let device_view = lab
            .service
            .get(EntityKind::Device, &device.id(), &ApiRequest::empty())
            .unwrap();
        assert_eq!(device_view, json!({"id": device.id(), "n_profiles": 1}));
    }

    #[test]
    fn test_result_rejected_until_profile_exists() {
        let lab = lab();
        let profile = KeyHolder::generate();

        let err = rejection(submit(&lab, &profile, json!({"minutes": 3})));
        assert!(matches!(
            err,
            RequestError::NotFound {
                kind: EntityKind::Profile,
                payload: Some(_),
                ..
            }
        ));

        let payload = json!({"profile": {"vk_pem": profile.pem, "exp_id": lab.exp.id}});
        lab.service
            .create_profile(&request(der_envelope(&payload, &[&profile])))
            .unwrap();
        submit(&lab, &profile, json!({"minutes": 3})).unwrap();
        assert_eq!(lab.service.store().count(EntityKind::Result), 1);
    }

    #[test]
    fn test_three_signatures_rejected_everywhere() {
        let lab = lab();
        let profile = KeyHolder::generate();
        let signers = [&profile, &profile, &profile];

        let create = json!({"profile": {"vk_pem": profile.pem, "exp_id": lab.exp.id}});
        let err = rejection(
            lab.service
                .create_profile(&request(der_envelope(&create, &signers))),
        );
        assert_eq!(err.kind(), DefectKind::TooManySignatures);

        let result = json!({"result": {"profile_id": profile.id(), "result_data": {}}});
        let err = rejection(
            lab.service
                .create_result(&request(der_envelope(&result, &signers))),
        );
        assert_eq!(err.kind(), DefectKind::TooManySignatures);
        assert_eq!(err.http_status(), 400);
        assert_eq!(lab.service.store().count(EntityKind::Profile), 0);
    }

    // =============================================================================
    // DEVICE BINDING
    // =============================================================================

    #[test]
    fn test_late_binding_happens_once() {
        let lab = lab();
        let profile = KeyHolder::generate();
        let phone = KeyHolder::generate();
        let tablet = KeyHolder::generate();
        register(&lab, &phone);
        register(&lab, &tablet);

        let payload = json!({"profile": {"vk_pem": profile.pem, "exp_id": lab.exp.id}});
        lab.service
            .create_profile(&request(der_envelope(&payload, &[&profile])))
            .unwrap();

        let bind = |device: &KeyHolder| json!({"profile": {"device_id": device.id()}});
        lab.service
            .update_profile(
                &profile.id(),
                &request(der_envelope(&bind(&phone), &[&profile, &phone])),
            )
            .unwrap();

        let err = rejection(lab.service.update_profile(
            &profile.id(),
            &request(der_envelope(&bind(&tablet), &[&profile, &tablet])),
        ));
        assert_eq!(
            err,
            RequestError::Conflict(ConflictKind::DeviceAlreadySet {
                profile_id: profile.id(),
                device_id: phone.id(),
            })
        );

        let stored = lab.service.store().find_profile(&profile.id()).unwrap();
        assert_eq!(stored.device_id, Some(phone.id()));
    }

    #[test]
    fn test_concurrent_binding_has_one_winner() {
        let lab = lab();
        let profile = KeyHolder::generate();
        let devices: Vec<KeyHolder> = (0..4).map(|_| KeyHolder::generate()).collect();
        for device in &devices {
            register(&lab, device);
        }
        let payload = json!({"profile": {"vk_pem": profile.pem, "exp_id": lab.exp.id}});
        lab.service
            .create_profile(&request(der_envelope(&payload, &[&profile])))
            .unwrap();

        let outcomes: Vec<Result<Value, ApiError>> = std::thread::scope(|scope| {
            let handles: Vec<_> = devices
                .iter()
                .map(|device| {
                    let body = der_envelope(
                        &json!({"profile": {"device_id": device.id()}}),
                        &[&profile, device],
                    );
                    let service = &lab.service;
                    let profile_id = profile.id();
                    scope.spawn(move || service.update_profile(&profile_id, &request(body)))
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let winners = outcomes.iter().filter(|o| o.is_ok()).count();
        assert_eq!(winners, 1);
        for outcome in outcomes.into_iter().filter(Result::is_err) {
            assert_eq!(rejection(outcome).kind(), DefectKind::Conflict);
        }
    }

    // =============================================================================
    // READS
    // =============================================================================

    #[test]
    fn test_views_follow_the_caller() {
        let lab = lab();
        let profile = KeyHolder::generate();
        let payload = json!({"profile": {
            "vk_pem": profile.pem,
            "exp_id": lab.exp.id,
            "profile_data": {"mode": "walk"}
        }});
        lab.service
            .create_profile(&request(der_envelope(&payload, &[&profile])))
            .unwrap();
        let stranger = lab.service.create_user("Kim", "kim@uni.edu").unwrap();

        let anonymous = lab
            .service
            .list(Collection::ProfilesOfExp, &lab.exp.id, &ApiRequest::empty())
            .unwrap();
        let as_stranger = lab
            .service
            .list(
                Collection::ProfilesOfExp,
                &lab.exp.id,
                &ApiRequest::empty().with_caller(&stranger.id),
            )
            .unwrap();
        let as_owner = lab
            .service
            .list(
                Collection::ProfilesOfExp,
                &lab.exp.id,
                &ApiRequest::empty().with_caller(&lab.owner.id),
            )
            .unwrap();

        assert_eq!(anonymous, as_stranger);
        assert!(anonymous[0].get("profile_data").is_none());
        assert_eq!(as_owner[0]["profile_data"], json!({"mode": "walk"}));
        assert_eq!(as_owner[0]["exp_id"], json!(lab.exp.id));
        assert_eq!(as_owner[0]["created_at"], json!("2024-03-10T08:00:00Z"));
    }

    #[test]
    fn test_human_timestamps_from_overrides() {
        let mut config = ApiConfig::default();
        config.apply_overrides(|key| (key == ENV_TIMESTAMP_FORMAT).then(|| "human".to_string()));
        let lab = lab_with(config);

        let read = lab
            .service
            .get(
                EntityKind::Exp,
                &lab.exp.id,
                &ApiRequest::empty().with_caller(&lab.owner.id),
            )
            .unwrap();
        assert_eq!(read["created_at"], json!("10/03/2024 at 08:00:00"));
    }
}
