use std::path::{Path, PathBuf};
use usbstick::{StateError, UsbStatus, UsbStick};
use usbstick_hal::{FakeHal, Operation};

fn controller() -> (UsbStick<FakeHal, FakeHal>, FakeHal) {
    let hal = FakeHal::new();
    (UsbStick::new(hal.clone(), hal.clone(), "/images/"), hal)
}

fn run_check(command: &str) -> Operation {
    Operation::RunCheck {
        command: command.to_string(),
    }
}

/// Upload, switch and plug in `foo.img`.
fn scenario_a() -> (UsbStick<FakeHal, FakeHal>, FakeHal) {
    let (mut stick, hal) = controller();
    stick.upload_image(Path::new("foo.img")).unwrap();
    stick.switch_image("foo.img").unwrap();
    assert_eq!(stick.active_image(), Some("foo.img"));
    assert_eq!(stick.status(), UsbStatus::Unplugged);

    hal.clear();
    stick.plug_in().unwrap();
    assert_eq!(
        hal.operations(),
        vec![run_check("modprobe g_mass_storage file=/images/foo.img")]
    );
    assert_eq!(stick.status(), UsbStatus::Plugged);
    (stick, hal)
}

#[test]
fn scenario_a_upload_switch_plug_in() {
    scenario_a();
}

#[test]
fn scenario_b_put_file_while_plugged_is_rejected() {
    let (mut stick, hal) = scenario_a();
    hal.clear();

    let err = stick.put_file(Path::new("local.txt"), None).unwrap_err();
    assert_eq!(err.state(), Some(&StateError::DeviceBusy));
    assert_eq!(hal.operation_count(), 0);
    assert_eq!(stick.status(), UsbStatus::Plugged);
}

#[test]
fn scenario_c_put_file_after_plug_out() {
    let (mut stick, hal) = scenario_a();
    stick.plug_out().unwrap();
    hal.clear();

    stick
        .put_file(Path::new("local.txt"), Some("dest.txt"))
        .unwrap();

    assert_eq!(
        hal.operations(),
        vec![
            run_check("losetup -Pf /images/foo.img"),
            run_check("mount /dev/loop0p1 /mnt/"),
            Operation::Put {
                local: PathBuf::from("local.txt"),
                remote: "/mnt/dest.txt".to_string(),
            },
            run_check("umount /mnt/"),
            run_check("losetup -D"),
        ]
    );
    assert_eq!(stick.status(), UsbStatus::Unplugged);
}

#[test]
fn scenario_d_switch_to_unknown_image() {
    let (mut stick, hal) = controller();
    stick.upload_image(Path::new("foo.img")).unwrap();
    stick.switch_image("foo.img").unwrap();
    hal.clear();

    let err = stick.switch_image("bar.img").unwrap_err();
    assert_eq!(
        err.state(),
        Some(&StateError::UnknownImage("bar.img".to_string()))
    );
    assert_eq!(stick.active_image(), Some("foo.img"));
    assert_eq!(hal.operation_count(), 0);
}

#[test]
fn plug_in_then_out_restores_unplugged() {
    let (mut stick, hal) = scenario_a();
    stick.plug_out().unwrap();

    assert_eq!(stick.status(), UsbStatus::Unplugged);
    assert_eq!(stick.active_image(), Some("foo.img"));
    assert_eq!(
        hal.commands(),
        vec![
            "modprobe g_mass_storage file=/images/foo.img",
            "modprobe -r g_mass_storage",
        ]
    );

    // The cycle repeats.
    stick.plug_in().unwrap();
    stick.plug_out().unwrap();
    assert_eq!(stick.status(), UsbStatus::Unplugged);
    assert_eq!(hal.operation_count(), 4);
}

#[test]
fn plug_in_without_image_fails_regardless_of_history() {
    let (mut stick, hal) = controller();
    assert_eq!(
        stick.plug_in().unwrap_err().state(),
        Some(&StateError::NoImageSelected)
    );

    stick.upload_image(Path::new("foo.img")).unwrap();
    stick.plug_out().unwrap();
    assert_eq!(
        stick.plug_in().unwrap_err().state(),
        Some(&StateError::NoImageSelected)
    );
    assert!(!hal.has_operation(|op| matches!(op, Operation::RunCheck { .. })));
}

#[test]
fn image_operations_rejected_while_plugged_without_side_effects() {
    let (mut stick, hal) = scenario_a();
    stick.upload_image(Path::new("bar.img")).unwrap_err();
    hal.clear();

    let errors = [
        stick.put_file(Path::new("local.txt"), None).unwrap_err(),
        stick.get_file("remote.txt", None).map(|_| ()).unwrap_err(),
        stick
            .upload_image(Path::new("bar.img"))
            .map(|_| ())
            .unwrap_err(),
        stick.switch_image("foo.img").unwrap_err(),
    ];
    for err in errors {
        assert_eq!(err.state(), Some(&StateError::DeviceBusy));
    }

    assert_eq!(hal.operation_count(), 0);
    assert_eq!(stick.known_images(), ["foo.img"]);
    assert_eq!(stick.status(), UsbStatus::Plugged);
}

#[test]
fn switch_to_uploaded_image_runs_best_effort_cleanup() {
    let (mut stick, hal) = controller();
    stick.upload_image(Path::new("/tmp/build/foo.img")).unwrap();
    stick.upload_image(Path::new("bar.img")).unwrap();
    hal.clear();

    stick.switch_image("foo.img").unwrap();
    assert_eq!(stick.active_image(), Some("foo.img"));
    assert_eq!(
        hal.operations(),
        vec![
            Operation::Run {
                command: "umount /mnt/".to_string()
            },
            Operation::Run {
                command: "losetup -D".to_string()
            },
        ]
    );
}

#[test]
fn upload_appends_every_time() {
    let (mut stick, hal) = controller();
    assert_eq!(stick.upload_image(Path::new("out/foo.img")).unwrap(), "foo.img");
    stick.upload_image(Path::new("foo.img")).unwrap();

    assert_eq!(stick.known_images(), ["foo.img", "foo.img"]);
    assert_eq!(stick.status(), UsbStatus::Unplugged);
    assert_eq!(stick.active_image(), None);
    assert_eq!(
        hal.operations(),
        vec![
            Operation::Put {
                local: PathBuf::from("out/foo.img"),
                remote: "/images/foo.img".to_string(),
            },
            Operation::Put {
                local: PathBuf::from("foo.img"),
                remote: "/images/foo.img".to_string(),
            },
        ]
    );
}

#[test]
fn image_dir_without_trailing_separator() {
    let hal = FakeHal::new();
    let mut stick = UsbStick::new(hal.clone(), hal.clone(), "/images");
    stick.upload_image(Path::new("foo.img")).unwrap();
    stick.switch_image("foo.img").unwrap();
    stick.get_file("a.txt", None).unwrap();
    stick.plug_in().unwrap();

    let commands = hal.commands();
    assert!(commands.contains(&"losetup -Pf /images/foo.img".to_string()));
    assert_eq!(
        commands.last().map(String::as_str),
        Some("modprobe g_mass_storage file=/images/foo.img")
    );
}
