/// Op ids. These cross process boundaries and must never be renumbered, new
/// ops are only ever appended.
pub type Op = u32;

pub const OP_COARSE_LOCATION: Op = 0;
pub const OP_FINE_LOCATION: Op = 1;
pub const OP_GPS: Op = 2;
pub const OP_VIBRATE: Op = 3;
pub const OP_READ_CONTACTS: Op = 4;
pub const OP_WRITE_CONTACTS: Op = 5;
pub const OP_READ_CALL_LOG: Op = 6;
pub const OP_WRITE_CALL_LOG: Op = 7;
pub const OP_READ_CALENDAR: Op = 8;
pub const OP_WRITE_CALENDAR: Op = 9;
pub const OP_WIFI_SCAN: Op = 10;
pub const OP_POST_NOTIFICATION: Op = 11;
pub const OP_NEIGHBORING_CELLS: Op = 12;
pub const OP_CALL_PHONE: Op = 13;
pub const OP_READ_SMS: Op = 14;
pub const OP_WRITE_SMS: Op = 15;
pub const OP_RECEIVE_SMS: Op = 16;
pub const OP_RECEIVE_EMERGECY_SMS: Op = 17;
pub const OP_RECEIVE_MMS: Op = 18;
pub const OP_RECEIVE_WAP_PUSH: Op = 19;
pub const OP_SEND_SMS: Op = 20;
pub const OP_READ_ICC_SMS: Op = 21;
pub const OP_WRITE_ICC_SMS: Op = 22;
pub const OP_WRITE_SETTINGS: Op = 23;
pub const OP_SYSTEM_ALERT_WINDOW: Op = 24;
pub const OP_ACCESS_NOTIFICATIONS: Op = 25;
pub const OP_CAMERA: Op = 26;
pub const OP_RECORD_AUDIO: Op = 27;
pub const OP_PLAY_AUDIO: Op = 28;
pub const OP_READ_CLIPBOARD: Op = 29;
pub const OP_WRITE_CLIPBOARD: Op = 30;
pub const OP_TAKE_MEDIA_BUTTONS: Op = 31;
pub const OP_TAKE_AUDIO_FOCUS: Op = 32;
pub const OP_AUDIO_MASTER_VOLUME: Op = 33;
pub const OP_AUDIO_VOICE_VOLUME: Op = 34;
pub const OP_AUDIO_RING_VOLUME: Op = 35;
pub const OP_AUDIO_MEDIA_VOLUME: Op = 36;
pub const OP_AUDIO_ALARM_VOLUME: Op = 37;
pub const OP_AUDIO_NOTIFICATION_VOLUME: Op = 38;
pub const OP_AUDIO_BLUETOOTH_VOLUME: Op = 39;
pub const OP_WAKE_LOCK: Op = 40;
pub const OP_MONITOR_LOCATION: Op = 41;
pub const OP_MONITOR_HIGH_POWER_LOCATION: Op = 42;
pub const OP_GET_USAGE_STATS: Op = 43;
pub const OP_MUTE_MICROPHONE: Op = 44;
pub const OP_TOAST_WINDOW: Op = 45;
pub const OP_PROJECT_MEDIA: Op = 46;
pub const OP_ACTIVATE_VPN: Op = 47;
pub const OP_WRITE_WALLPAPER: Op = 48;
pub const OP_ASSIST_STRUCTURE: Op = 49;
pub const OP_ASSIST_SCREENSHOT: Op = 50;
pub const OP_READ_PHONE_STATE: Op = 51;
pub const OP_ADD_VOICEMAIL: Op = 52;
pub const OP_USE_SIP: Op = 53;
pub const OP_PROCESS_OUTGOING_CALLS: Op = 54;
pub const OP_USE_FINGERPRINT: Op = 55;
pub const OP_BODY_SENSORS: Op = 56;
pub const OP_READ_CELL_BROADCASTS: Op = 57;
pub const OP_MOCK_LOCATION: Op = 58;
pub const OP_READ_EXTERNAL_STORAGE: Op = 59;
pub const OP_WRITE_EXTERNAL_STORAGE: Op = 60;
pub const OP_TURN_SCREEN_ON: Op = 61;
pub const OP_GET_ACCOUNTS: Op = 62;
pub const OP_RUN_IN_BACKGROUND: Op = 63;
pub const OP_AUDIO_ACCESSIBILITY_VOLUME: Op = 64;
pub const OP_READ_PHONE_NUMBERS: Op = 65;
pub const OP_REQUEST_INSTALL_PACKAGES: Op = 66;
pub const OP_PICTURE_IN_PICTURE: Op = 67;
pub const OP_INSTANT_APP_START_FOREGROUND: Op = 68;
pub const OP_ANSWER_PHONE_CALLS: Op = 69;
pub const OP_RUN_ANY_IN_BACKGROUND: Op = 70;
pub const OP_CHANGE_WIFI_STATE: Op = 71;
pub const OP_REQUEST_DELETE_PACKAGES: Op = 72;
pub const OP_BIND_ACCESSIBILITY_SERVICE: Op = 73;
pub const OP_ACCEPT_HANDOVER: Op = 74;
pub const OP_MANAGE_IPSEC_TUNNELS: Op = 75;
pub const OP_START_FOREGROUND: Op = 76;
pub const OP_BLUETOOTH_SCAN: Op = 77;

/// Number of known ops
pub const N_OP: usize = 78;
