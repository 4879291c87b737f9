use std::collections::HashMap;
use std::sync::Arc;

use itertools::izip;
use once_cell::sync::Lazy;
use serde::Serialize;

use super::codes::*;
use super::mode::Mode;

/// One op's metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpRow {
    pub op: Op,
    /// Debug name
    pub name: String,
    /// Stable externally visible id such as `android:camera`
    pub public_name: Option<String>,
    /// The op whose mode governs this one
    pub switch: Op,
    pub permission: Option<String>,
    pub restriction: Option<String>,
    pub default_mode: Mode,
    pub allow_system_bypass: bool,
    pub allow_reset: bool,
}

/// The parallel per-op columns an [OpTable] is built from. Every column must
/// hold exactly [N_OP] entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpColumns {
    pub switches: Vec<Op>,
    pub public_names: Vec<Option<String>>,
    pub names: Vec<String>,
    pub permissions: Vec<Option<String>>,
    pub restrictions: Vec<Option<String>>,
    pub allow_system_bypass: Vec<bool>,
    pub default_modes: Vec<Mode>,
    pub disable_reset: Vec<bool>,
}

fn owned(col: &[Option<&str>]) -> Vec<Option<String>> {
    col.iter().map(|it| it.map(String::from)).collect()
}

impl OpColumns {
    /// The authored columns for every known op
    pub fn builtin() -> Self {
        Self {
            switches: SWITCHES.to_vec(),
            public_names: owned(PUBLIC_NAMES),
            names: NAMES.iter().map(|it| String::from(*it)).collect(),
            permissions: owned(PERMISSIONS),
            restrictions: owned(RESTRICTIONS),
            allow_system_bypass: ALLOW_SYSTEM_BYPASS.to_vec(),
            default_modes: DEFAULT_MODES.to_vec(),
            disable_reset: DISABLE_RESET.to_vec(),
        }
    }

    fn check_lengths(&self) -> crate::Result<()> {
        let lengths = [
            ("switch", self.switches.len()),
            ("public name", self.public_names.len()),
            ("name", self.names.len()),
            ("permission", self.permissions.len()),
            ("restriction", self.restrictions.len()),
            ("system bypass", self.allow_system_bypass.len()),
            ("default mode", self.default_modes.len()),
            ("disable reset", self.disable_reset.len()),
        ];
        for (col, len) in lengths {
            if len != N_OP {
                return Err(crate::Error::Configuration(format!(
                    "{} column has {} entries, expected {}",
                    col, len, N_OP
                )));
            }
        }
        Ok(())
    }
}

/// The ops that runtime and app op permissions are mapped back to by
/// [OpTable::op_for_permission]
pub fn runtime_and_appop_permission_ops() -> &'static [Op] {
    RUNTIME_AND_APPOP_PERMISSION_OPS
}

static BUILTIN: Lazy<Arc<OpTable>> = Lazy::new(|| {
    match OpTable::from_columns(OpColumns::builtin(), RUNTIME_AND_APPOP_PERMISSION_OPS) {
        Ok(v) => Arc::new(v),
        Err(e) => panic!("{}", e),
    }
});

/// Immutable registry of every op, with the public name and permission
/// indexes derived from it
#[derive(Debug)]
pub struct OpTable {
    rows: Vec<OpRow>,
    by_public_name: HashMap<String, Op>,
    by_permission: HashMap<String, Op>,
}

impl OpTable {
    /// The process wide table built from the authored columns. Building it
    /// is fatal if the columns are inconsistent.
    pub fn builtin() -> Arc<OpTable> {
        Arc::clone(&BUILTIN)
    }

    /// Build a table, failing with [crate::Error::Configuration] if any
    /// column is the wrong length or a cross reference is out of range.
    ///
    /// Only ops listed in `runtime_ops` are reachable through
    /// [OpTable::op_for_permission].
    pub fn from_columns(cols: OpColumns, runtime_ops: &[Op]) -> crate::Result<Self> {
        cols.check_lengths()?;

        let mut rows = Vec::with_capacity(N_OP);
        let mut by_public_name = HashMap::with_capacity(N_OP);

        let OpColumns {
            switches,
            public_names,
            names,
            permissions,
            restrictions,
            allow_system_bypass,
            default_modes,
            disable_reset,
        } = cols;

        let columns = izip!(
            switches,
            public_names,
            names,
            permissions,
            restrictions,
            allow_system_bypass,
            default_modes,
            disable_reset
        );

        for (op, (switch, public_name, name, permission, restriction, bypass, mode, no_reset)) in
            columns.enumerate()
        {
            let op = op as Op;

            if switch as usize >= N_OP {
                return Err(crate::Error::Configuration(format!(
                    "op {} ({}) switches on unknown op {}",
                    op, name, switch
                )));
            }

            if let Some(public) = &public_name {
                if let Some(prev) = by_public_name.insert(public.clone(), op) {
                    return Err(crate::Error::Configuration(format!(
                        "public name {} used by both op {} and op {}",
                        public, prev, op
                    )));
                }
            }

            rows.push(OpRow {
                op,
                name,
                public_name,
                switch,
                permission,
                restriction,
                default_mode: mode,
                allow_system_bypass: bypass,
                allow_reset: !no_reset,
            });
        }

        let mut by_permission = HashMap::with_capacity(runtime_ops.len());
        for &op in runtime_ops {
            let row = rows.get(op as usize).ok_or_else(|| {
                crate::Error::Configuration(format!("runtime permission op {} is unknown", op))
            })?;
            if let Some(perm) = &row.permission {
                by_permission.insert(perm.clone(), op);
            }
        }

        Ok(Self {
            rows,
            by_public_name,
            by_permission,
        })
    }

    /// The row for `op`, panicking if it is outside the table
    #[inline]
    pub fn get(&self, op: Op) -> &OpRow {
        &self.rows[op as usize]
    }

    pub fn row(&self, op: Op) -> Option<&OpRow> {
        self.rows.get(op as usize)
    }

    /// Every row in op id order
    pub fn ops(&self) -> impl Iterator<Item = &OpRow> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn op_for_public_name(&self, public_name: &str) -> Option<Op> {
        self.by_public_name.get(public_name).copied()
    }

    pub fn op_for_permission(&self, permission: &str) -> Option<Op> {
        self.by_permission.get(permission).copied()
    }

    /// Debug name reverse lookup
    pub fn id_for_debug_name(&self, name: &str) -> crate::Result<Op> {
        self.rows
            .iter()
            .find(|row| row.name == name)
            .map(|row| row.op)
            .ok_or_else(|| crate::Error::NotFound(format!("unknown op name {}", name)))
    }
}

static SWITCHES: &[Op] = &[
    OP_COARSE_LOCATION, OP_COARSE_LOCATION, OP_COARSE_LOCATION, OP_VIBRATE, OP_READ_CONTACTS,
    OP_WRITE_CONTACTS, OP_READ_CALL_LOG, OP_WRITE_CALL_LOG, OP_READ_CALENDAR, OP_WRITE_CALENDAR,
    OP_COARSE_LOCATION, OP_POST_NOTIFICATION, OP_COARSE_LOCATION, OP_CALL_PHONE, OP_READ_SMS,
    OP_WRITE_SMS, OP_RECEIVE_SMS, OP_RECEIVE_SMS, OP_RECEIVE_MMS, OP_RECEIVE_WAP_PUSH, OP_SEND_SMS,
    OP_READ_SMS, OP_WRITE_SMS, OP_WRITE_SETTINGS, OP_SYSTEM_ALERT_WINDOW, OP_ACCESS_NOTIFICATIONS,
    OP_CAMERA, OP_RECORD_AUDIO, OP_PLAY_AUDIO, OP_READ_CLIPBOARD, OP_WRITE_CLIPBOARD,
    OP_TAKE_MEDIA_BUTTONS, OP_TAKE_AUDIO_FOCUS, OP_AUDIO_MASTER_VOLUME, OP_AUDIO_VOICE_VOLUME,
    OP_AUDIO_RING_VOLUME, OP_AUDIO_MEDIA_VOLUME, OP_AUDIO_ALARM_VOLUME,
    OP_AUDIO_NOTIFICATION_VOLUME, OP_AUDIO_BLUETOOTH_VOLUME, OP_WAKE_LOCK, OP_COARSE_LOCATION,
    OP_COARSE_LOCATION, OP_GET_USAGE_STATS, OP_MUTE_MICROPHONE, OP_TOAST_WINDOW, OP_PROJECT_MEDIA,
    OP_ACTIVATE_VPN, OP_WRITE_WALLPAPER, OP_ASSIST_STRUCTURE, OP_ASSIST_SCREENSHOT,
    OP_READ_PHONE_STATE, OP_ADD_VOICEMAIL, OP_USE_SIP, OP_PROCESS_OUTGOING_CALLS,
    OP_USE_FINGERPRINT, OP_BODY_SENSORS, OP_READ_CELL_BROADCASTS, OP_MOCK_LOCATION,
    OP_READ_EXTERNAL_STORAGE, OP_WRITE_EXTERNAL_STORAGE, OP_TURN_SCREEN_ON, OP_GET_ACCOUNTS,
    OP_RUN_IN_BACKGROUND, OP_AUDIO_ACCESSIBILITY_VOLUME, OP_READ_PHONE_NUMBERS,
    OP_REQUEST_INSTALL_PACKAGES, OP_PICTURE_IN_PICTURE, OP_INSTANT_APP_START_FOREGROUND,
    OP_ANSWER_PHONE_CALLS, OP_RUN_ANY_IN_BACKGROUND, OP_CHANGE_WIFI_STATE,
    OP_REQUEST_DELETE_PACKAGES, OP_BIND_ACCESSIBILITY_SERVICE, OP_ACCEPT_HANDOVER,
    OP_MANAGE_IPSEC_TUNNELS, OP_START_FOREGROUND, OP_COARSE_LOCATION,
];

static PUBLIC_NAMES: &[Option<&str>] = &[
    Some("android:coarse_location"),
    Some("android:fine_location"),
    Some("android:gps"),
    Some("android:vibrate"),
    Some("android:read_contacts"),
    Some("android:write_contacts"),
    Some("android:read_call_log"),
    Some("android:write_call_log"),
    Some("android:read_calendar"),
    Some("android:write_calendar"),
    Some("android:wifi_scan"),
    Some("android:post_notification"),
    Some("android:neighboring_cells"),
    Some("android:call_phone"),
    Some("android:read_sms"),
    Some("android:write_sms"),
    Some("android:receive_sms"),
    Some("android:receive_emergency_broadcast"),
    Some("android:receive_mms"),
    Some("android:receive_wap_push"),
    Some("android:send_sms"),
    Some("android:read_icc_sms"),
    Some("android:write_icc_sms"),
    Some("android:write_settings"),
    Some("android:system_alert_window"),
    Some("android:access_notifications"),
    Some("android:camera"),
    Some("android:record_audio"),
    Some("android:play_audio"),
    Some("android:read_clipboard"),
    Some("android:write_clipboard"),
    Some("android:take_media_buttons"),
    Some("android:take_audio_focus"),
    Some("android:audio_master_volume"),
    Some("android:audio_voice_volume"),
    Some("android:audio_ring_volume"),
    Some("android:audio_media_volume"),
    Some("android:audio_alarm_volume"),
    Some("android:audio_notification_volume"),
    Some("android:audio_bluetooth_volume"),
    Some("android:wake_lock"),
    Some("android:monitor_location"),
    Some("android:monitor_location_high_power"),
    Some("android:get_usage_stats"),
    Some("android:mute_microphone"),
    Some("android:toast_window"),
    Some("android:project_media"),
    Some("android:activate_vpn"),
    Some("android:write_wallpaper"),
    Some("android:assist_structure"),
    Some("android:assist_screenshot"),
    Some("android:read_phone_state"),
    Some("android:add_voicemail"),
    Some("android:use_sip"),
    Some("android:process_outgoing_calls"),
    Some("android:use_fingerprint"),
    Some("android:body_sensors"),
    Some("android:read_cell_broadcasts"),
    Some("android:mock_location"),
    Some("android:read_external_storage"),
    Some("android:write_external_storage"),
    Some("android:turn_screen_on"),
    Some("android:get_accounts"),
    Some("android:run_in_background"),
    Some("android:audio_accessibility_volume"),
    Some("android:read_phone_numbers"),
    Some("android:request_install_packages"),
    Some("android:picture_in_picture"),
    Some("android:instant_app_start_foreground"),
    Some("android:answer_phone_calls"),
    Some("android:run_any_in_background"),
    Some("android:change_wifi_state"),
    Some("android:request_delete_packages"),
    Some("android:bind_accessibility_service"),
    Some("android:accept_handover"),
    Some("android:manage_ipsec_tunnels"),
    Some("android:start_foreground"),
    Some("android:bluetooth_scan"),
];

static NAMES: &[&str] = &[
    "COARSE_LOCATION",
    "FINE_LOCATION",
    "GPS",
    "VIBRATE",
    "READ_CONTACTS",
    "WRITE_CONTACTS",
    "READ_CALL_LOG",
    "WRITE_CALL_LOG",
    "READ_CALENDAR",
    "WRITE_CALENDAR",
    "WIFI_SCAN",
    "POST_NOTIFICATION",
    "NEIGHBORING_CELLS",
    "CALL_PHONE",
    "READ_SMS",
    "WRITE_SMS",
    "RECEIVE_SMS",
    "RECEIVE_EMERGECY_SMS",
    "RECEIVE_MMS",
    "RECEIVE_WAP_PUSH",
    "SEND_SMS",
    "READ_ICC_SMS",
    "WRITE_ICC_SMS",
    "WRITE_SETTINGS",
    "SYSTEM_ALERT_WINDOW",
    "ACCESS_NOTIFICATIONS",
    "CAMERA",
    "RECORD_AUDIO",
    "PLAY_AUDIO",
    "READ_CLIPBOARD",
    "WRITE_CLIPBOARD",
    "TAKE_MEDIA_BUTTONS",
    "TAKE_AUDIO_FOCUS",
    "AUDIO_MASTER_VOLUME",
    "AUDIO_VOICE_VOLUME",
    "AUDIO_RING_VOLUME",
    "AUDIO_MEDIA_VOLUME",
    "AUDIO_ALARM_VOLUME",
    "AUDIO_NOTIFICATION_VOLUME",
    "AUDIO_BLUETOOTH_VOLUME",
    "WAKE_LOCK",
    "MONITOR_LOCATION",
    "MONITOR_HIGH_POWER_LOCATION",
    "GET_USAGE_STATS",
    "MUTE_MICROPHONE",
    "TOAST_WINDOW",
    "PROJECT_MEDIA",
    "ACTIVATE_VPN",
    "WRITE_WALLPAPER",
    "ASSIST_STRUCTURE",
    "ASSIST_SCREENSHOT",
    "OP_READ_PHONE_STATE",
    "ADD_VOICEMAIL",
    "USE_SIP",
    "PROCESS_OUTGOING_CALLS",
    "USE_FINGERPRINT",
    "BODY_SENSORS",
    "READ_CELL_BROADCASTS",
    "MOCK_LOCATION",
    "READ_EXTERNAL_STORAGE",
    "WRITE_EXTERNAL_STORAGE",
    "TURN_ON_SCREEN",
    "GET_ACCOUNTS",
    "RUN_IN_BACKGROUND",
    "AUDIO_ACCESSIBILITY_VOLUME",
    "READ_PHONE_NUMBERS",
    "REQUEST_INSTALL_PACKAGES",
    "PICTURE_IN_PICTURE",
    "INSTANT_APP_START_FOREGROUND",
    "ANSWER_PHONE_CALLS",
    "RUN_ANY_IN_BACKGROUND",
    "CHANGE_WIFI_STATE",
    "REQUEST_DELETE_PACKAGES",
    "BIND_ACCESSIBILITY_SERVICE",
    "ACCEPT_HANDOVER",
    "MANAGE_IPSEC_TUNNELS",
    "START_FOREGROUND",
    "BLUETOOTH_SCAN",
];

static PERMISSIONS: &[Option<&str>] = &[
    Some("android.permission.ACCESS_COARSE_LOCATION"),
    Some("android.permission.ACCESS_FINE_LOCATION"),
    None,
    Some("android.permission.VIBRATE"),
    Some("android.permission.READ_CONTACTS"),
    Some("android.permission.WRITE_CONTACTS"),
    Some("android.permission.READ_CALL_LOG"),
    Some("android.permission.WRITE_CALL_LOG"),
    Some("android.permission.READ_CALENDAR"),
    Some("android.permission.WRITE_CALENDAR"),
    Some("android.permission.ACCESS_WIFI_STATE"),
    None,
    None,
    Some("android.permission.CALL_PHONE"),
    Some("android.permission.READ_SMS"),
    None,
    Some("android.permission.RECEIVE_SMS"),
    Some("android.permission.RECEIVE_EMERGENCY_BROADCAST"),
    Some("android.permission.RECEIVE_MMS"),
    Some("android.permission.RECEIVE_WAP_PUSH"),
    Some("android.permission.SEND_SMS"),
    Some("android.permission.READ_SMS"),
    None,
    Some("android.permission.WRITE_SETTINGS"),
    Some("android.permission.SYSTEM_ALERT_WINDOW"),
    Some("android.permission.ACCESS_NOTIFICATIONS"),
    Some("android.permission.CAMERA"),
    Some("android.permission.RECORD_AUDIO"),
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    Some("android.permission.WAKE_LOCK"),
    None,
    None,
    Some("android.permission.PACKAGE_USAGE_STATS"),
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    Some("android.permission.READ_PHONE_STATE"),
    Some("com.android.voicemail.permission.ADD_VOICEMAIL"),
    Some("android.permission.USE_SIP"),
    Some("android.permission.PROCESS_OUTGOING_CALLS"),
    Some("android.permission.USE_FINGERPRINT"),
    Some("android.permission.BODY_SENSORS"),
    Some("android.permission.READ_CELL_BROADCASTS"),
    None,
    Some("android.permission.READ_EXTERNAL_STORAGE"),
    Some("android.permission.WRITE_EXTERNAL_STORAGE"),
    None,
    Some("android.permission.GET_ACCOUNTS"),
    None,
    None,
    Some("android.permission.READ_PHONE_NUMBERS"),
    Some("android.permission.REQUEST_INSTALL_PACKAGES"),
    None,
    Some("android.permission.INSTANT_APP_FOREGROUND_SERVICE"),
    Some("android.permission.ANSWER_PHONE_CALLS"),
    None,
    Some("android.permission.CHANGE_WIFI_STATE"),
    Some("android.permission.REQUEST_DELETE_PACKAGES"),
    Some("android.permission.BIND_ACCESSIBILITY_SERVICE"),
    Some("android.permission.ACCEPT_HANDOVER"),
    None,
    Some("android.permission.FOREGROUND_SERVICE"),
    None,
];

static RESTRICTIONS: &[Option<&str>] = &[
    Some("no_share_location"),
    Some("no_share_location"),
    Some("no_share_location"),
    None,
    None,
    None,
    Some("no_outgoing_calls"),
    Some("no_outgoing_calls"),
    None,
    None,
    Some("no_share_location"),
    None,
    None,
    None,
    Some("no_sms"),
    Some("no_sms"),
    Some("no_sms"),
    None,
    Some("no_sms"),
    None,
    Some("no_sms"),
    Some("no_sms"),
    Some("no_sms"),
    None,
    Some("no_create_windows"),
    None,
    Some("no_camera"),
    Some("no_record_audio"),
    None,
    None,
    None,
    None,
    None,
    Some("no_adjust_volume"),
    Some("no_adjust_volume"),
    Some("no_adjust_volume"),
    Some("no_adjust_volume"),
    Some("no_adjust_volume"),
    Some("no_adjust_volume"),
    Some("no_adjust_volume"),
    None,
    Some("no_share_location"),
    Some("no_share_location"),
    None,
    Some("no_unmute_microphone"),
    Some("no_create_windows"),
    None,
    None,
    Some("no_wallpaper"),
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    Some("no_adjust_volume"),
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
];

static ALLOW_SYSTEM_BYPASS: &[bool] = &[
    true, true, false, false, false, false, false, false, false, false, true, false, false, false,
    false, false, false, false, false, false, false, false, false, false, true, false, false, false,
    false, false, false, false, false, false, false, false, false, false, false, false, false,
    false, false, false, false, true, false, false, false, false, false, false, false, false, false,
    false, false, false, false, false, false, false, false, false, false, false, false, false,
    false, false, false, false, false, false, false, false, false, true,
];

static DEFAULT_MODES: &[Mode] = &[
    Mode::Allowed, Mode::Allowed, Mode::Allowed, Mode::Allowed, Mode::Allowed, Mode::Allowed,
    Mode::Allowed, Mode::Allowed, Mode::Allowed, Mode::Allowed, Mode::Allowed, Mode::Allowed,
    Mode::Allowed, Mode::Allowed, Mode::Allowed, Mode::Ignored, Mode::Allowed, Mode::Allowed,
    Mode::Allowed, Mode::Allowed, Mode::Allowed, Mode::Allowed, Mode::Allowed, Mode::Default,
    Mode::Default, Mode::Allowed, Mode::Allowed, Mode::Allowed, Mode::Allowed, Mode::Allowed,
    Mode::Allowed, Mode::Allowed, Mode::Allowed, Mode::Allowed, Mode::Allowed, Mode::Allowed,
    Mode::Allowed, Mode::Allowed, Mode::Allowed, Mode::Allowed, Mode::Allowed, Mode::Allowed,
    Mode::Allowed, Mode::Default, Mode::Allowed, Mode::Allowed, Mode::Ignored, Mode::Ignored,
    Mode::Allowed, Mode::Allowed, Mode::Allowed, Mode::Allowed, Mode::Allowed, Mode::Allowed,
    Mode::Allowed, Mode::Allowed, Mode::Allowed, Mode::Allowed, Mode::Errored, Mode::Allowed,
    Mode::Allowed, Mode::Allowed, Mode::Allowed, Mode::Allowed, Mode::Allowed, Mode::Allowed,
    Mode::Default, Mode::Allowed, Mode::Default, Mode::Allowed, Mode::Allowed, Mode::Allowed,
    Mode::Allowed, Mode::Allowed, Mode::Allowed, Mode::Errored, Mode::Allowed, Mode::Allowed,
];

static DISABLE_RESET: &[bool] = &[
    false, false, false, false, false, false, false, false, false, false, false, false, false,
    false, false, true, false, false, false, false, false, false, false, false, false, false, false,
    false, false, false, false, false, false, false, false, false, false, false, false, false,
    false, false, false, false, false, false, false, false, false, false, false, false, false,
    false, false, false, false, false, false, false, false, false, false, false, false, false,
    false, false, false, false, false, false, false, false, false, false, false, false,
];

static RUNTIME_AND_APPOP_PERMISSION_OPS: &[Op] = &[
    OP_READ_CONTACTS, OP_WRITE_CONTACTS, OP_GET_ACCOUNTS, OP_READ_CALENDAR, OP_WRITE_CALENDAR,
    OP_SEND_SMS, OP_RECEIVE_SMS, OP_READ_SMS, OP_RECEIVE_WAP_PUSH, OP_RECEIVE_MMS,
    OP_READ_CELL_BROADCASTS, OP_READ_EXTERNAL_STORAGE, OP_WRITE_EXTERNAL_STORAGE,
    OP_COARSE_LOCATION, OP_FINE_LOCATION, OP_READ_PHONE_STATE, OP_READ_PHONE_NUMBERS, OP_CALL_PHONE,
    OP_READ_CALL_LOG, OP_WRITE_CALL_LOG, OP_ADD_VOICEMAIL, OP_USE_SIP, OP_PROCESS_OUTGOING_CALLS,
    OP_ANSWER_PHONE_CALLS, OP_ACCEPT_HANDOVER, OP_RECORD_AUDIO, OP_CAMERA, OP_BODY_SENSORS,
    OP_ACCESS_NOTIFICATIONS, OP_SYSTEM_ALERT_WINDOW, OP_WRITE_SETTINGS, OP_REQUEST_INSTALL_PACKAGES,
    OP_START_FOREGROUND,
];
